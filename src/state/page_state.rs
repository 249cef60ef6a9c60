/// Page status definitions for tracking crawl progress
///
/// A frontier page is either waiting for a visit, done, or failed on its last
/// attempt. Failed pages are retried on the next run.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the visit status of a frontier page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    /// Page has been discovered but not yet visited
    Unvisited,

    /// Page was visited successfully
    Fetched,

    /// The last visit attempt failed or panicked
    Error,
}

impl PageStatus {
    /// Returns true if a run should (re)visit a page in this status
    ///
    /// Only fetched pages are skipped; errored pages are retried.
    pub fn needs_visit(&self) -> bool {
        !matches!(self, Self::Fetched)
    }

    /// Returns true if a visit has been attempted and settled
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Fetched | Self::Error)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unvisited => "unvisited",
            Self::Fetched => "fetched",
            Self::Error => "error",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "unvisited" => Some(Self::Unvisited),
            "fetched" => Some(Self::Fetched),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns all possible page statuses
    pub fn all_statuses() -> [Self; 3] {
        [Self::Unvisited, Self::Fetched, Self::Error]
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_visit() {
        assert!(PageStatus::Unvisited.needs_visit());
        assert!(PageStatus::Error.needs_visit());
        assert!(!PageStatus::Fetched.needs_visit());
    }

    #[test]
    fn test_is_settled() {
        assert!(!PageStatus::Unvisited.is_settled());
        assert!(PageStatus::Fetched.is_settled());
        assert!(PageStatus::Error.is_settled());
    }

    #[test]
    fn test_from_db_string() {
        assert_eq!(
            PageStatus::from_db_string("unvisited"),
            Some(PageStatus::Unvisited)
        );
        assert_eq!(
            PageStatus::from_db_string("fetched"),
            Some(PageStatus::Fetched)
        );
        assert_eq!(PageStatus::from_db_string("error"), Some(PageStatus::Error));
        assert_eq!(PageStatus::from_db_string("Fetched"), None);
    }

    #[test]
    fn test_roundtrip_db_string() {
        for status in PageStatus::all_statuses() {
            let parsed = PageStatus::from_db_string(status.to_db_string());
            assert_eq!(Some(status), parsed, "Failed roundtrip for {:?}", status);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageStatus::Unvisited), "unvisited");
        assert_eq!(format!("{}", PageStatus::Error), "error");
    }
}
