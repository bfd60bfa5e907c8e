use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which actor's logs to list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRole {
    #[default]
    Patient,
    Doctor,
    Admin,
}

impl LogRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogRole::Patient => "patient",
            LogRole::Doctor => "doctor",
            LogRole::Admin => "admin",
        }
    }
}

impl fmt::Display for LogRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(LogRole::Patient),
            "doctor" => Ok(LogRole::Doctor),
            "admin" => Ok(LogRole::Admin),
            other => Err(format!("Unknown log role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditLog {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub user_name: Option<String>,
    pub admin_name: Option<String>,
    pub role: Option<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub action: String,
    pub details: Option<Value>,
    pub ip: Option<String>,
}

impl AuditLog {
    pub fn actor(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.admin_name.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// `key=value` pairs of the details object, in the order received
    pub fn details_display(&self) -> String {
        match self.details {
            Some(Value::Object(ref map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => format!("{}={}", k, s),
                    other => format!("{}={}", k, other),
                })
                .collect::<Vec<_>>()
                .join(" "),
            Some(ref other) => other.to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_log() {
        let log: AuditLog = serde_json::from_value(json!({
            "id": "l1",
            "timestamp": "2025-05-01T08:30:00Z",
            "adminName": "Root",
            "action": "UPDATE_STATUS",
            "details": {"status": "confirmed", "count": 2},
            "ip": "10.0.0.1"
        }))
        .unwrap();
        assert_eq!(log.actor(), "Root");
        assert!(log.timestamp_utc().is_some());
        assert_eq!(log.details_display(), "status=confirmed count=2");
    }

    #[test]
    fn test_null_action() {
        let log: AuditLog = serde_json::from_str(r#"{"id":"l2","action":null}"#).unwrap();
        assert_eq!(log.action, "");
        assert_eq!(log.actor(), "Unknown");
        assert_eq!(log.details_display(), "");
    }

    #[test]
    fn test_log_role_from_str() {
        assert_eq!("ADMIN".parse(), Ok(LogRole::Admin));
        assert!("nurse".parse::<LogRole>().is_err());
    }
}
