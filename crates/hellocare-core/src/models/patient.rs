use serde::{Deserialize, Serialize};

use super::Appointment;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Patient {
    pub user_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub phone: Option<String>,
}

impl Patient {
    /// Backend records use either `userId` or `id`
    pub fn key(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.id.as_deref())
    }

    pub fn name_display(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    pub fn email_display(&self) -> &str {
        self.email.as_deref().unwrap_or("N/A")
    }

    pub fn phone_display(&self) -> &str {
        self.phone_number
            .as_deref()
            .or(self.phone.as_deref())
            .unwrap_or("N/A")
    }
}

/// A patient with their appointment count and most recent appointment
#[derive(Debug, Clone)]
pub struct PatientSummary {
    pub patient: Patient,
    pub total_appointments: usize,
    pub last_appointment: Option<Appointment>,
}

impl PatientSummary {
    pub fn build(patients: &[Patient], appointments: &[Appointment]) -> Vec<PatientSummary> {
        patients
            .iter()
            .map(|patient| {
                let key = patient.key();
                let mut own: Vec<&Appointment> = appointments
                    .iter()
                    .filter(|a| key == Some(a.patient_id.as_str()))
                    .collect();
                own.sort_by_key(|a| std::cmp::Reverse(a.parsed_date()));

                PatientSummary {
                    patient: patient.clone(),
                    total_appointments: own.len(),
                    last_appointment: own.first().map(|a| (*a).clone()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appt(id: &str, patient: &str, date: &str) -> Appointment {
        Appointment {
            appointment_id: id.to_string(),
            patient_id: patient.to_string(),
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_key_prefers_user_id() {
        let patient: Patient = serde_json::from_str(r#"{"userId":"u1","id":"x"}"#).unwrap();
        assert_eq!(patient.key(), Some("u1"));

        let patient: Patient = serde_json::from_str(r#"{"id":"x","phone":"555"}"#).unwrap();
        assert_eq!(patient.key(), Some("x"));
        assert_eq!(patient.phone_display(), "555");
        assert_eq!(patient.name_display(), "Unknown");
    }

    #[test]
    fn test_summary_counts_and_latest() {
        let patients = vec![
            Patient {
                user_id: Some("p1".into()),
                ..Default::default()
            },
            Patient {
                id: Some("p2".into()),
                ..Default::default()
            },
        ];
        let appointments = vec![
            appt("a1", "p1", "2025-01-10"),
            appt("a2", "p1", "2025-02-01"),
            appt("a3", "p3", "2025-03-01"),
        ];

        let summaries = PatientSummary::build(&patients, &appointments);
        assert_eq!(summaries[0].total_appointments, 2);
        assert_eq!(
            summaries[0]
                .last_appointment
                .as_ref()
                .map(|a| a.appointment_id.as_str()),
            Some("a2")
        );
        assert_eq!(summaries[1].total_appointments, 0);
        assert!(summaries[1].last_appointment.is_none());
    }
}
