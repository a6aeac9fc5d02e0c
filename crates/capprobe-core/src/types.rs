//! Shared types used across capability probing.
//!
//! Newtypes validate on construction so a snapshot that made it past the
//! loader is known to be well-formed.

use crate::error::ProbeError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for environment (tenant) identifiers.
///
/// Identifiers are 15 or 18 ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnvironmentId(String);

impl EnvironmentId {
    /// Create a new `EnvironmentId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not 15 or 18 alphanumeric characters.
    pub fn new(id: impl Into<String>) -> Result<Self, ProbeError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), ProbeError> {
        static ID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = ID_REGEX.get_or_init(|| {
            Regex::new(r"^(?:[A-Za-z0-9]{15}|[A-Za-z0-9]{18})$").expect("valid regex")
        });

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(ProbeError::Validation(format!(
                "invalid environment ID: must be 15 or 18 alphanumeric characters, got '{id}'"
            )))
        }
    }
}

impl TryFrom<String> for EnvironmentId {
    type Error = ProbeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EnvironmentId> for String {
    fn from(id: EnvironmentId) -> Self {
        id.0
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified cache partition name: `<scope-prefix>.<developer-name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartitionId(String);

impl PartitionId {
    /// Compose a partition id from a scope prefix and a developer name.
    ///
    /// # Errors
    /// Returns error if either segment is not an identifier.
    pub fn compose(scope_prefix: &str, developer_name: &str) -> Result<Self, ProbeError> {
        Self::validate_segment("scope prefix", scope_prefix)?;
        Self::validate_segment("developer name", developer_name)?;
        Ok(Self(format!("{scope_prefix}.{developer_name}")))
    }

    /// Parse a fully qualified partition id such as `local.Main`.
    ///
    /// # Errors
    /// Returns error if the value is not exactly two identifier segments.
    pub fn parse(value: &str) -> Result<Self, ProbeError> {
        match value.split_once('.') {
            Some((prefix, name)) => Self::compose(prefix, name),
            None => Err(ProbeError::Validation(format!(
                "invalid partition ID: expected '<prefix>.<name>', got '{value}'"
            ))),
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scope prefix segment.
    #[must_use]
    pub fn scope_prefix(&self) -> &str {
        self.0.split_once('.').map_or("", |(prefix, _)| prefix)
    }

    /// The developer name segment.
    #[must_use]
    pub fn developer_name(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, name)| name)
    }

    fn validate_segment(what: &str, segment: &str) -> Result<(), ProbeError> {
        static SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SEGMENT_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,79}$").expect("valid regex"));

        if regex.is_match(segment) {
            Ok(())
        } else {
            Err(ProbeError::Validation(format!(
                "invalid partition {what}: must be an identifier, got '{segment}'"
            )))
        }
    }
}

impl TryFrom<String> for PartitionId {
    type Error = ProbeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PartitionId> for String {
    fn from(id: PartitionId) -> Self {
        id.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Month in which the fiscal year starts (1 = January ... 12 = December).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct FiscalMonth(u8);

impl FiscalMonth {
    /// Create a new `FiscalMonth`.
    ///
    /// # Errors
    /// Returns error if the month is outside 1-12.
    pub fn new(month: i64) -> Result<Self, ProbeError> {
        match u8::try_from(month) {
            Ok(m @ 1..=12) => Ok(Self(m)),
            _ => Err(ProbeError::Validation(format!(
                "invalid fiscal month: must be 1-12, got {month}"
            ))),
        }
    }

    /// Month number, 1-12.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for FiscalMonth {
    type Error = ProbeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FiscalMonth> for u8 {
    fn from(month: FiscalMonth) -> Self {
        month.0
    }
}

impl fmt::Display for FiscalMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw environment record as returned by the environment source.
///
/// Nothing here is validated; [`EnvironmentSnapshot::try_from`] does that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    /// Environment identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Namespace prefix; `None` or empty means no namespace
    #[serde(default)]
    pub namespace_prefix: Option<String>,
    /// Organization type label (e.g. "Developer Edition")
    pub organization_type: String,
    /// Whether this is a sandbox environment
    #[serde(default)]
    pub is_sandbox: bool,
    /// Whether the environment is in read-only mode
    #[serde(default)]
    pub is_read_only: bool,
    /// Instance (pod) name
    pub instance_name: String,
    /// Fiscal-year start month as stored, expected 1-12
    pub fiscal_year_start_month: i64,
    /// Default locale key
    pub locale_key: String,
    /// Default timezone key
    pub time_zone_key: String,
}

/// Immutable snapshot of environment attributes.
///
/// Built once per capability context from a validated [`EnvironmentRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSnapshot {
    id: EnvironmentId,
    name: String,
    namespace_prefix: Option<String>,
    organization_type: String,
    is_sandbox: bool,
    is_read_only: bool,
    instance_name: String,
    fiscal_year_start_month: FiscalMonth,
    locale_key: String,
    time_zone_key: String,
}

impl EnvironmentSnapshot {
    /// Environment identifier.
    #[must_use]
    pub fn id(&self) -> &EnvironmentId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace prefix, `None` when the environment has none.
    #[must_use]
    pub fn namespace_prefix(&self) -> Option<&str> {
        self.namespace_prefix.as_deref()
    }

    /// Whether a namespace prefix is set.
    #[must_use]
    pub fn has_namespace_prefix(&self) -> bool {
        self.namespace_prefix.is_some()
    }

    /// Organization type label.
    #[must_use]
    pub fn organization_type(&self) -> &str {
        &self.organization_type
    }

    /// Whether this is a sandbox environment.
    #[must_use]
    pub fn is_sandbox(&self) -> bool {
        self.is_sandbox
    }

    /// Whether the environment is read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.is_read_only
    }

    /// Instance (pod) name.
    #[must_use]
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Fiscal-year start month.
    #[must_use]
    pub fn fiscal_year_start_month(&self) -> FiscalMonth {
        self.fiscal_year_start_month
    }

    /// Default locale key.
    #[must_use]
    pub fn locale_key(&self) -> &str {
        &self.locale_key
    }

    /// Default timezone key.
    #[must_use]
    pub fn time_zone_key(&self) -> &str {
        &self.time_zone_key
    }
}

impl TryFrom<EnvironmentRecord> for EnvironmentSnapshot {
    type Error = ProbeError;

    fn try_from(record: EnvironmentRecord) -> Result<Self, Self::Error> {
        let invalid = |field: &str, err: ProbeError| ProbeError::InvalidSnapshot {
            field: field.to_string(),
            reason: err.to_string(),
        };

        let id = EnvironmentId::new(record.id).map_err(|e| invalid("id", e))?;
        let fiscal_year_start_month = FiscalMonth::new(record.fiscal_year_start_month)
            .map_err(|e| invalid("fiscal_year_start_month", e))?;

        let namespace_prefix = record
            .namespace_prefix
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty());

        Ok(Self {
            id,
            name: record.name,
            namespace_prefix,
            organization_type: record.organization_type,
            is_sandbox: record.is_sandbox,
            is_read_only: record.is_read_only,
            instance_name: record.instance_name,
            fiscal_year_start_month,
            locale_key: record.locale_key,
            time_zone_key: record.time_zone_key,
        })
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, ProbeError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| ProbeError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EnvironmentRecord {
        EnvironmentRecord {
            id: "00D000000000001AAA".to_string(),
            name: "Acme".to_string(),
            namespace_prefix: None,
            organization_type: "Developer Edition".to_string(),
            is_sandbox: false,
            is_read_only: false,
            instance_name: "NA42".to_string(),
            fiscal_year_start_month: 1,
            locale_key: "en_US".to_string(),
            time_zone_key: "America/Los_Angeles".to_string(),
        }
    }

    #[test]
    fn test_environment_id_valid() {
        let valid_ids = vec!["00D000000000001", "00D000000000001AAA"];
        for id in valid_ids {
            assert!(EnvironmentId::new(id).is_ok(), "Failed for: {id}");
        }
    }

    #[test]
    fn test_environment_id_invalid() {
        let invalid_ids = vec![
            "",
            "00D00000000001",      // 14 chars
            "00D000000000001A",    // 16 chars
            "00D00000000000-1AAA", // punctuation
        ];
        for id in invalid_ids {
            assert!(EnvironmentId::new(id).is_err(), "Should fail for: {id}");
        }
    }

    #[test]
    fn test_partition_id_compose() {
        let id = PartitionId::compose("local", "Main").expect("compose partition id");
        assert_eq!(id.as_str(), "local.Main");
        assert_eq!(id.scope_prefix(), "local");
        assert_eq!(id.developer_name(), "Main");
    }

    #[test]
    fn test_partition_id_invalid() {
        assert!(PartitionId::compose("", "Main").is_err());
        assert!(PartitionId::compose("local", "").is_err());
        assert!(PartitionId::compose("local", "has space").is_err());
        assert!(PartitionId::parse("noseparator").is_err());
        assert!(PartitionId::parse("a.b.c").is_err());
    }

    #[test]
    fn test_partition_id_serde() {
        let id: PartitionId = serde_json::from_str("\"local.Main\"").expect("deserialize");
        assert_eq!(id.developer_name(), "Main");
        assert!(serde_json::from_str::<PartitionId>("\"Main\"").is_err());
    }

    #[test]
    fn test_fiscal_month_bounds() {
        assert_eq!(FiscalMonth::new(1).expect("january").get(), 1);
        assert_eq!(FiscalMonth::new(12).expect("december").get(), 12);
        assert!(FiscalMonth::new(0).is_err());
        assert!(FiscalMonth::new(13).is_err());
        assert!(FiscalMonth::new(-4).is_err());
    }

    #[test]
    fn test_snapshot_empty_namespace_is_none() {
        let mut rec = record();
        rec.namespace_prefix = Some(String::new());
        let snapshot = EnvironmentSnapshot::try_from(rec).expect("valid record");
        assert!(!snapshot.has_namespace_prefix());
        assert_eq!(snapshot.namespace_prefix(), None);
    }

    #[test]
    fn test_snapshot_namespace_kept() {
        let mut rec = record();
        rec.namespace_prefix = Some("acme".to_string());
        let snapshot = EnvironmentSnapshot::try_from(rec).expect("valid record");
        assert!(snapshot.has_namespace_prefix());
        assert_eq!(snapshot.namespace_prefix(), Some("acme"));
    }

    #[test]
    fn test_snapshot_rejects_bad_fiscal_month() {
        let mut rec = record();
        rec.fiscal_year_start_month = 13;
        let err = EnvironmentSnapshot::try_from(rec).expect_err("month 13 is invalid");
        assert!(matches!(
            err,
            ProbeError::InvalidSnapshot { ref field, .. } if field == "fiscal_year_start_month"
        ));
    }

    #[test]
    fn test_snapshot_rejects_bad_id() {
        let mut rec = record();
        rec.id = "nope".to_string();
        let err = EnvironmentSnapshot::try_from(rec).expect_err("short id is invalid");
        assert!(matches!(err, ProbeError::InvalidSnapshot { ref field, .. } if field == "id"));
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::now();
        let s = ts.to_rfc3339();
        let parsed = Timestamp::from_rfc3339(&s).expect("parse RFC3339 timestamp");
        assert_eq!(ts.timestamp(), parsed.timestamp());
    }
}
