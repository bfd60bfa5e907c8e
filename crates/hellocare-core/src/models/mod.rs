//! Data models for HelloCare entities.
//!
//! - `Identity`, `Role`: the signed-in administrator
//! - `Doctor`, `Patient`, `Appointment`, `AuditLog`: remote resources the
//!   backend owns; decoded for display, never mutated locally
//! - `DashboardStats`, `RevenueSummary`, `PatientSummary`: small aggregates

use serde::{Deserialize, Deserializer};

pub mod appointment;
pub mod audit_log;
pub mod doctor;
pub mod identity;
pub mod patient;
pub mod stats;

pub use appointment::{Appointment, AppointmentStatus};
pub use audit_log::{AuditLog, LogRole};
pub use doctor::Doctor;
pub use identity::{Identity, Role};
pub use patient::{Patient, PatientSummary};
pub use stats::{DashboardStats, RevenueSummary, CONSULTATION_FEE};

/// Treat an explicit JSON `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
