use serde::{Deserialize, Serialize};

use super::Appointment;

/// Flat fee charged per billable appointment
pub const CONSULTATION_FEE: u64 = 50;

/// Platform totals reported by `GET /admin/stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    #[serde(deserialize_with = "super::null_as_default")]
    pub doctors: u64,
    #[serde(deserialize_with = "super::null_as_default")]
    pub patients: u64,
    #[serde(deserialize_with = "super::null_as_default")]
    pub appointments: u64,
    #[serde(deserialize_with = "super::null_as_default")]
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevenueSummary {
    pub transactions: usize,
    pub total: u64,
    pub paid: u64,
    pub pending: u64,
}

impl RevenueSummary {
    pub fn from_appointments(appointments: &[Appointment]) -> Self {
        appointments
            .iter()
            .filter(|a| a.is_billable())
            .fold(Self::default(), |mut acc, a| {
                acc.transactions += 1;
                acc.total += CONSULTATION_FEE;
                if a.is_paid() {
                    acc.paid += CONSULTATION_FEE;
                } else {
                    acc.pending += CONSULTATION_FEE;
                }
                acc
            })
    }
}
