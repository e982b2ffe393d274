use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Created,
    #[serde(rename = "Under Assistance")]
    UnderAssistance,
    Completed,
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "Created",
            Status::UnderAssistance => "Under Assistance",
            Status::Completed => "Completed",
            Status::Open => "Open",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
        }
    }

    /// Accepts the display label in any case, with `-` or `_` standing in for spaces.
    pub fn from_str(value: &str) -> Option<Self> {
        let normalized = value
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "created" => Some(Status::Created),
            "under assistance" => Some(Status::UnderAssistance),
            "completed" => Some(Status::Completed),
            "open" => Some(Status::Open),
            "in progress" => Some(Status::InProgress),
            "resolved" => Some(Status::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of statuses a store accepts. The first member is the
/// default for new drafts and the last one is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusScheme {
    #[default]
    Assistance,
    Resolution,
}

const ASSISTANCE: [Status; 3] = [Status::Created, Status::UnderAssistance, Status::Completed];
const RESOLUTION: [Status; 3] = [Status::Open, Status::InProgress, Status::Resolved];

impl StatusScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusScheme::Assistance => "assistance",
            StatusScheme::Resolution => "resolution",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "assistance" => Some(StatusScheme::Assistance),
            "resolution" => Some(StatusScheme::Resolution),
            _ => None,
        }
    }

    pub fn statuses(&self) -> &'static [Status] {
        match self {
            StatusScheme::Assistance => &ASSISTANCE,
            StatusScheme::Resolution => &RESOLUTION,
        }
    }

    pub fn default_status(&self) -> Status {
        self.statuses()[0]
    }

    pub fn terminal(&self) -> Status {
        self.statuses()[self.statuses().len() - 1]
    }

    pub fn contains(&self, status: Status) -> bool {
        self.statuses().contains(&status)
    }

    pub fn is_terminal(&self, status: Status) -> bool {
        status == self.terminal()
    }

    /// Parses a status label, rejecting members of other schemes.
    pub fn parse_status(&self, value: &str) -> Option<Status> {
        Status::from_str(value).filter(|status| self.contains(*status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_labels_loosely() {
        assert_eq!(
            Status::from_str("Under Assistance"),
            Some(Status::UnderAssistance)
        );
        assert_eq!(Status::from_str("in_progress"), Some(Status::InProgress));
        assert_eq!(Status::from_str("  RESOLVED "), Some(Status::Resolved));
        assert_eq!(Status::from_str("closed"), None);
    }

    #[test]
    fn schemes_expose_default_and_terminal() {
        assert_eq!(StatusScheme::Assistance.default_status(), Status::Created);
        assert_eq!(StatusScheme::Assistance.terminal(), Status::Completed);
        assert_eq!(StatusScheme::Resolution.default_status(), Status::Open);
        assert_eq!(StatusScheme::Resolution.terminal(), Status::Resolved);
        assert!(StatusScheme::Resolution.is_terminal(Status::Resolved));
        assert!(!StatusScheme::Resolution.is_terminal(Status::InProgress));
    }

    #[test]
    fn scheme_rejects_foreign_statuses() {
        let scheme = StatusScheme::Resolution;
        assert_eq!(scheme.parse_status("open"), Some(Status::Open));
        assert_eq!(scheme.parse_status("completed"), None);
        assert!(!scheme.contains(Status::Created));
    }

    #[test]
    fn serializes_status_as_label() {
        let json = serde_json::to_string(&Status::UnderAssistance).unwrap();
        assert_eq!(json, "\"Under Assistance\"");
    }
}
