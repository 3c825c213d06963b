use std::fmt;

/// A directory on the node agent, held as segments. Root is the empty
/// sequence. Navigation always produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = Self::root();
        for segment in segments {
            path.push_normalized(segment.as_ref());
        }
        path
    }

    /// Parses a user-typed path. `..` never climbs above root.
    pub fn parse(path: &str) -> Self {
        let normalized = normalize(path);
        Self::from_segments(normalized.split('/'))
    }

    fn push_normalized(&mut self, segment: &str) {
        match segment {
            "" | "." => {}
            ".." => {
                self.segments.pop();
            }
            other => self.segments.push(other.to_string()),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn join(&self, name: &str) -> Self {
        let mut path = self.clone();
        path.push_normalized(name);
        path
    }

    /// Absolute path string of an entry inside this directory.
    pub fn child(&self, name: &str) -> String {
        if self.is_root() {
            format!("/{name}")
        } else {
            format!("{self}/{name}")
        }
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

pub fn normalize(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }
    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }
    normalized
}

pub fn is_within_scope(path: &str, root: &str) -> bool {
    let path = normalize(path);
    let root = normalize(root);

    if path == root {
        return true;
    }

    if root == "/" {
        return path.starts_with('/');
    }

    path.starts_with(&(root + "/"))
}
