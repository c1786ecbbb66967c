//! Maintenance status types

use serde::{Deserialize, Serialize};

/// Failure label used when the `failure_type` column is absent or a cell is empty.
pub const DEFAULT_FAILURE_TYPE: &str = "Normal";

/// Value of the `maintenance_required` column.
///
/// Serializes as the raw `0` / `1` code so view payloads match the CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MaintenanceStatus {
    /// `0` - machine operating normally
    Normal,
    /// `1` - machine needs maintenance
    Required,
}

impl MaintenanceStatus {
    /// Raw column code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Required => 1,
        }
    }

    /// Label used for elapsed-time buckets (bar chart x axis).
    pub const fn bucket_label(self) -> &'static str {
        match self {
            Self::Normal => "maintenance not required",
            Self::Required => "maintenance required",
        }
    }

    /// Prefix used for the composite ratio label (pie chart slices).
    pub const fn ratio_prefix(self) -> &'static str {
        match self {
            Self::Normal => "no maintenance needed",
            Self::Required => "needs maintenance",
        }
    }

    /// Parse a CSV cell. Accepts integer, float and boolean spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "0" | "0.0" | "false" | "False" | "FALSE" => Some(Self::Normal),
            "1" | "1.0" | "true" | "True" | "TRUE" => Some(Self::Required),
            _ => None,
        }
    }
}

impl From<MaintenanceStatus> for u8 {
    fn from(status: MaintenanceStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for MaintenanceStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Required),
            other => Err(format!("maintenance_required must be 0 or 1, got {other}")),
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bucket_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_common_spellings() {
        assert_eq!(MaintenanceStatus::parse("0"), Some(MaintenanceStatus::Normal));
        assert_eq!(MaintenanceStatus::parse(" 1 "), Some(MaintenanceStatus::Required));
        assert_eq!(MaintenanceStatus::parse("1.0"), Some(MaintenanceStatus::Required));
        assert_eq!(MaintenanceStatus::parse("false"), Some(MaintenanceStatus::Normal));
        assert_eq!(MaintenanceStatus::parse("2"), None);
        assert_eq!(MaintenanceStatus::parse(""), None);
    }

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&MaintenanceStatus::Required).unwrap();
        assert_eq!(json, "1");
        let back: MaintenanceStatus = serde_json::from_str("0").unwrap();
        assert_eq!(back, MaintenanceStatus::Normal);
        assert!(serde_json::from_str::<MaintenanceStatus>("3").is_err());
    }

    #[test]
    fn test_normal_orders_first() {
        assert!(MaintenanceStatus::Normal < MaintenanceStatus::Required);
    }
}
