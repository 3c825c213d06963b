use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Edit,
    Download,
    Copy,
    Rename,
    Move,
    Delete,
    Extract,
    CreateDirectory,
    CreateFile,
    Compress,
    Chmod,
}

impl FileAction {
    /// Lower-case verb phrase used in user-facing messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Download => "download",
            Self::Copy => "copy",
            Self::Rename => "rename",
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Extract => "extract",
            Self::CreateDirectory => "create folder",
            Self::CreateFile => "create file",
            Self::Compress => "compress",
            Self::Chmod => "change permissions of",
        }
    }
}

impl std::fmt::Display for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit => write!(f, "edit"),
            Self::Download => write!(f, "download"),
            Self::Copy => write!(f, "copy"),
            Self::Rename => write!(f, "rename"),
            Self::Move => write!(f, "move"),
            Self::Delete => write!(f, "delete"),
            Self::Extract => write!(f, "extract"),
            Self::CreateDirectory => write!(f, "create_directory"),
            Self::CreateFile => write!(f, "create_file"),
            Self::Compress => write!(f, "compress"),
            Self::Chmod => write!(f, "chmod"),
        }
    }
}

impl std::str::FromStr for FileAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(Self::Edit),
            "download" => Ok(Self::Download),
            "copy" => Ok(Self::Copy),
            "rename" => Ok(Self::Rename),
            "move" => Ok(Self::Move),
            "delete" => Ok(Self::Delete),
            "extract" => Ok(Self::Extract),
            "create_directory" | "mkdir" => Ok(Self::CreateDirectory),
            "create_file" | "new-file" => Ok(Self::CreateFile),
            "compress" => Ok(Self::Compress),
            "chmod" => Ok(Self::Chmod),
            _ => Err(format!("unknown file action: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_from_str_agree() {
        for action in [
            FileAction::Edit,
            FileAction::Download,
            FileAction::Copy,
            FileAction::Rename,
            FileAction::Move,
            FileAction::Delete,
            FileAction::Extract,
            FileAction::CreateDirectory,
            FileAction::CreateFile,
            FileAction::Compress,
            FileAction::Chmod,
        ] {
            assert_eq!(action.to_string().parse::<FileAction>(), Ok(action));
        }
    }

    #[test]
    fn toolbar_aliases_parse() {
        assert_eq!("mkdir".parse::<FileAction>(), Ok(FileAction::CreateDirectory));
        assert_eq!("new-file".parse::<FileAction>(), Ok(FileAction::CreateFile));
        assert!("format".parse::<FileAction>().is_err());
    }
}
