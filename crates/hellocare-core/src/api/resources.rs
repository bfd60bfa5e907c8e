//! Typed accessors for the admin endpoints. Responses are wrapped in a
//! `{"data": {...}}` envelope; a missing collection decodes as empty.

use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, OutboundRequest};
use crate::models::{
    Appointment, AppointmentStatus, AuditLog, DashboardStats, Doctor, LogRole, Patient,
};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct StatsData {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    stats: DashboardStats,
}

#[derive(Debug, Deserialize)]
struct DoctorsData {
    doctors: Option<Vec<Doctor>>,
}

#[derive(Debug, Deserialize)]
struct PatientsData {
    patients: Option<Vec<Patient>>,
}

#[derive(Debug, Deserialize)]
struct AppointmentsData {
    appointments: Option<Vec<Appointment>>,
}

#[derive(Debug, Deserialize)]
struct LogsData {
    logs: Option<Vec<AuditLog>>,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: AppointmentStatus,
}

impl ApiClient {
    /// Platform totals for the dashboard
    pub async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        let response: Envelope<StatsData> = self.get("/admin/stats").await?;
        Ok(response.data.stats)
    }

    pub async fn fetch_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        let response: Envelope<DoctorsData> = self.get("/doctors").await?;
        Ok(response.data.doctors.unwrap_or_default())
    }

    pub async fn fetch_patients(&self) -> Result<Vec<Patient>, ApiError> {
        let response: Envelope<PatientsData> = self.get("/admin/patients").await?;
        Ok(response.data.patients.unwrap_or_default())
    }

    /// All appointments, or the most recent `limit`
    pub async fn fetch_appointments(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<Appointment>, ApiError> {
        let mut request = OutboundRequest::get("/admin/appointments");
        if let Some(limit) = limit {
            request = request.query("limit", limit);
        }
        let response: Envelope<AppointmentsData> = self.send(request).await?;
        Ok(response.data.appointments.unwrap_or_default())
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/admin/appointments/{}/status", appointment_id);
        let _: serde_json::Value = self.put(&path, &StatusUpdate { status }).await?;
        Ok(())
    }

    pub async fn fetch_audit_logs(
        &self,
        role: LogRole,
        limit: u32,
    ) -> Result<Vec<AuditLog>, ApiError> {
        let request = OutboundRequest::get("/admin/logs")
            .query("limit", limit)
            .query("role", role);
        let response: Envelope<LogsData> = self.send(request).await?;
        Ok(response.data.logs.unwrap_or_default())
    }
}
