use crate::models::file_entry::FileEntry;

/// Files at or above this size are never opened in the editor.
pub const MAX_EDITABLE_SIZE: u64 = 10 * 1024 * 1024;

const ARCHIVE_MIMES: &[&str] = &[
    "application/zip",
    "application/x-tar",
    "application/x-gzip",
    "application/x-rar-compressed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTypeInfo {
    pub icon: &'static str,
    pub can_edit: bool,
    pub viewable: bool,
}

const DIRECTORY: FileTypeInfo = FileTypeInfo {
    icon: "folder",
    can_edit: false,
    viewable: false,
};

const GENERIC: FileTypeInfo = FileTypeInfo {
    icon: "file",
    can_edit: false,
    viewable: true,
};

const PROPERTIES: FileTypeInfo = FileTypeInfo {
    icon: "file-settings",
    can_edit: true,
    viewable: true,
};

const TEXT: FileTypeInfo = FileTypeInfo {
    icon: "file-text",
    can_edit: true,
    viewable: true,
};

const CODE: FileTypeInfo = FileTypeInfo {
    icon: "file-code",
    can_edit: true,
    viewable: true,
};

const ARCHIVE: FileTypeInfo = FileTypeInfo {
    icon: "file-archive",
    can_edit: false,
    viewable: false,
};

/// Ordered MIME prefixes. The longest matching prefix wins.
const MIME_TABLE: &[(&str, FileTypeInfo)] = &[
    ("text/", TEXT),
    ("text/x-java-properties", PROPERTIES),
    ("text/x-properties", PROPERTIES),
    ("application/x-java-properties", PROPERTIES),
    ("application/json", CODE),
    ("application/javascript", CODE),
    ("application/x-yaml", CODE),
    ("application/yaml", CODE),
    ("application/xml", CODE),
    ("application/toml", CODE),
    ("application/zip", ARCHIVE),
    ("application/x-tar", ARCHIVE),
    ("application/x-gzip", ARCHIVE),
    ("application/x-rar-compressed", ARCHIVE),
    (
        "image/",
        FileTypeInfo {
            icon: "file-image",
            can_edit: false,
            viewable: true,
        },
    ),
    (
        "audio/",
        FileTypeInfo {
            icon: "file-audio",
            can_edit: false,
            viewable: false,
        },
    ),
    (
        "video/",
        FileTypeInfo {
            icon: "file-video",
            can_edit: false,
            viewable: false,
        },
    ),
];

/// `.properties` is checked before the prefix scan: agents report those files
/// under several MIME types, some of them `application/octet-stream`.
pub fn classify(name: &str, mime: &str) -> FileTypeInfo {
    if name.ends_with(".properties") || mime.ends_with(".properties") {
        return PROPERTIES;
    }

    MIME_TABLE
        .iter()
        .filter(|(prefix, _)| mime.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, info)| *info)
        .unwrap_or(GENERIC)
}

pub fn classify_entry(entry: &FileEntry) -> FileTypeInfo {
    if entry.is_directory() {
        return DIRECTORY;
    }
    classify(&entry.name, &entry.mime_hint())
}

pub fn is_editable(entry: &FileEntry) -> bool {
    entry.is_file && entry.size < MAX_EDITABLE_SIZE && classify_entry(entry).can_edit
}

pub fn is_archive(entry: &FileEntry) -> bool {
    entry.is_file && ARCHIVE_MIMES.contains(&entry.mime_hint().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_prefix_is_editable() {
        assert!(classify("latest.log", "text/plain").can_edit);
        assert_eq!(classify("index.html", "text/html").icon, "file-text");
    }

    #[test]
    fn longest_prefix_wins() {
        assert_eq!(classify("a", "text/x-java-properties"), PROPERTIES);
        assert_eq!(classify("a", "text/csv"), TEXT);
    }

    #[test]
    fn properties_suffix_overrides_mime() {
        assert_eq!(classify("server.properties", "application/octet-stream"), PROPERTIES);
        assert_eq!(classify("x", "inode/x.properties"), PROPERTIES);
    }

    #[test]
    fn code_types_are_editable() {
        for mime in ["application/json", "application/javascript", "application/x-yaml"] {
            let info = classify("f", mime);
            assert!(info.can_edit, "{mime}");
            assert_eq!(info.icon, "file-code");
        }
    }

    #[test]
    fn unmatched_defaults_to_generic() {
        assert_eq!(classify("server.jar", "application/java-archive"), GENERIC);
        assert_eq!(classify("blob", ""), GENERIC);
    }

    #[test]
    fn large_files_are_never_editable() {
        let small = FileEntry::file("config.yml", 120, "application/x-yaml");
        let large = FileEntry::file("config.yml", MAX_EDITABLE_SIZE, "application/x-yaml");
        assert!(is_editable(&small));
        assert!(!is_editable(&large));
    }

    #[test]
    fn directories_are_not_editable() {
        let mut dir = FileEntry::directory("plugins");
        dir.mime = "text/plain".to_string();
        assert!(!is_editable(&dir));
        assert_eq!(classify_entry(&dir).icon, "folder");
    }

    #[test]
    fn archives_are_detected_by_mime() {
        assert!(is_archive(&FileEntry::file("w.zip", 1, "application/zip")));
        assert!(is_archive(&FileEntry::file("w.tar.gz", 1, "application/x-gzip")));
        assert!(!is_archive(&FileEntry::file("w.txt", 1, "text/plain")));
    }
}
