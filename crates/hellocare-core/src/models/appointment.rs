use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    #[default]
    #[serde(other)]
    Other,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Other => "other",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    /// Only the statuses an admin can set are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(format!(
                "Unknown appointment status '{}' \
                 (expected pending, confirmed, cancelled or completed)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appointment {
    #[serde(deserialize_with = "super::null_as_default")]
    pub appointment_id: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub patient_id: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub patient_name: String,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
}

impl Appointment {
    /// Calendar date of the appointment. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        raw.get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    pub fn notes_display(&self) -> &str {
        self.notes
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("No notes")
    }

    /// Confirmed and completed appointments are billed
    pub fn is_billable(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Confirmed | AppointmentStatus::Completed
        )
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
            || self.status == AppointmentStatus::Completed
    }
}
