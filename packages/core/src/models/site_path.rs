//! Site Path Normalization
//!
//! A site path names a group by its chain of ancestor names, separated by `/`.
//! The normalization rule applied to every path is:
//!
//! 1. Surrounding whitespace is trimmed from the whole path and from every segment.
//! 2. An empty path, or any empty segment (`DC1//Rack10`, `/DC1`, `DC1/`), is rejected.
//! 3. If the first segment equals the root name it is dropped, so `ROOT/DC1/Rack10`
//!    and `DC1/Rack10` address the same group. Otherwise the root is implied.
//!
//! A consequence of rule 3 is that a top-level group literally named like the
//! root cannot be addressed without spelling the root twice (`ROOT/ROOT/...`).

use thiserror::Error;

/// Rejected site path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("site path is empty")]
    Empty,

    #[error("site path '{path}' has an empty segment at position {position}")]
    EmptySegment { path: String, position: usize },
}

/// A normalized site path: the group names below the root, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePath {
    segments: Vec<String>,
}

impl SitePath {
    /// Parse `raw` relative to a hierarchy whose root is named `root_name`
    pub fn parse(raw: &str, root_name: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, segment) in trimmed.split('/').enumerate() {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: trimmed.to_string(),
                    position,
                });
            }
            segments.push(segment.to_string());
        }

        if segments[0] == root_name {
            segments.remove(0);
        }

        Ok(Self { segments })
    }

    /// Group names below the root, outermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the path addresses the root itself
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// This path placed underneath `prefix`
    pub fn under(&self, prefix: &SitePath) -> SitePath {
        let mut segments = prefix.segments.clone();
        segments.extend(self.segments.iter().cloned());
        SitePath { segments }
    }

    /// Full path string including the root, as stored in the path index
    pub fn full_path(&self, root_name: &str) -> String {
        let mut full = root_name.to_string();
        for segment in &self.segments {
            full.push('/');
            full.push_str(segment);
        }
        full
    }
}
