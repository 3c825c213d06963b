use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One node of the remote filesystem as reported by the node agent.
///
/// `hidden`, `readonly` and `no_delete` are policy flags asserted by the
/// agent. They gate actions locally but the agent enforces them again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub size: u64,
    pub is_file: bool,
    #[serde(default)]
    pub is_symlink: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mime: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub no_delete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Epoch values at or above this are taken as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Accepts RFC 3339 strings, `YYYY-MM-DD HH:MM:SS` (UTC) and epoch seconds
/// or milliseconds. Anything else becomes `None` rather than failing the
/// whole listing.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|t| t.and_utc())
            }),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|epoch| {
            if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(epoch)
            } else {
                DateTime::from_timestamp(epoch, 0)
            }
        }),
        _ => None,
    })
}

impl FileEntry {
    pub fn file(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: String::new(),
            size,
            is_file: true,
            is_symlink: false,
            modified_at: None,
            created_at: None,
            mime: mime.into(),
            hidden: false,
            readonly: false,
            no_delete: false,
            custom_properties: None,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            is_file: false,
            ..Self::file(name, 0, "inode/directory")
        }
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn with_no_delete(mut self, no_delete: bool) -> Self {
        self.no_delete = no_delete;
        self
    }

    pub fn is_directory(&self) -> bool {
        !self.is_file
    }

    /// MIME type reported by the agent, or one guessed from the extension
    /// when the agent sent none.
    pub fn mime_hint(&self) -> String {
        if !self.mime.is_empty() {
            return self.mime.clone();
        }
        mime_guess::from_path(&self.name)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_default()
    }

    /// Rename and move remove the old path, so both flags must allow it.
    pub fn can_modify(&self) -> bool {
        !self.readonly && !self.no_delete
    }

    pub fn can_delete(&self) -> bool {
        !self.no_delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_agent_payload() {
        let json = r#"{
            "name": "server.properties",
            "mode": "-rw-r--r--",
            "size": 1204,
            "isFile": true,
            "isSymlink": false,
            "modifiedAt": "2025-01-01T10:00:00Z",
            "createdAt": "2024-12-31T09:30:00Z",
            "mime": "text/x-java-properties",
            "noDelete": true,
            "customProperties": { "cargo": { "id": 7 } }
        }"#;

        let entry: FileEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.name, "server.properties");
        assert_eq!(entry.size, 1204);
        assert!(entry.is_file);
        assert!(entry.no_delete);
        assert!(!entry.readonly);
        assert!(!entry.hidden);
        assert!(entry.modified_at.is_some());
        assert_eq!(
            entry.custom_properties.unwrap()["cargo"]["id"],
            serde_json::json!(7)
        );
    }

    #[test]
    fn missing_optional_fields_default() {
        let entry: FileEntry = serde_json::from_str(r#"{"name":"plugins","isFile":false}"#).unwrap();
        assert!(entry.is_directory());
        assert_eq!(entry.size, 0);
        assert!(entry.mode.is_empty());
        assert!(entry.can_modify());
    }

    #[test]
    fn mime_hint_falls_back_to_extension() {
        let mut entry = FileEntry::file("notes.txt", 4, "");
        assert_eq!(entry.mime_hint(), "text/plain");
        entry.mime = "application/x-yaml".to_string();
        assert_eq!(entry.mime_hint(), "application/x-yaml");
    }

    #[test]
    fn policy_flags_gate_modification() {
        let entry = FileEntry::file("a.txt", 1, "text/plain");
        assert!(entry.can_modify());
        assert!(!entry.clone().with_readonly(true).can_modify());
        assert!(entry.clone().with_readonly(true).can_delete());
        assert!(!entry.clone().with_no_delete(true).can_modify());
        assert!(!entry.with_no_delete(true).can_delete());
    }

    #[test]
    fn timestamps_accept_epochs_and_skip_garbage() {
        let expected = DateTime::parse_from_rfc3339("2025-01-01T10:00:00Z").unwrap().with_timezone(&Utc);
        let parse = |value: &str| -> FileEntry {
            serde_json::from_str(&format!(r#"{{"name":"a.txt","isFile":true,"modifiedAt":{value}}}"#)).unwrap()
        };

        assert_eq!(parse(r#""2025-01-01T10:00:00+00:00""#).modified_at, Some(expected));
        assert_eq!(parse(r#""2025-01-01 10:00:00""#).modified_at, Some(expected));
        assert_eq!(parse("1735725600").modified_at, Some(expected));
        assert_eq!(parse("1735725600000").modified_at, Some(expected));
        assert_eq!(parse("null").modified_at, None);

        let entry = parse(r#""last tuesday""#);
        assert_eq!(entry.modified_at, None);
        assert_eq!(entry.name, "a.txt");
        assert_eq!(parse("true").modified_at, None);
    }
}
