use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Doctor {
    #[serde(deserialize_with = "super::null_as_default")]
    pub doctor_id: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub specialization: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub email: String,
    pub phone: Option<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub rating: f64,
    pub years_of_experience: Option<u32>,
    pub profile_image_url: Option<String>,
}

impl Doctor {
    pub fn phone_display(&self) -> &str {
        self.phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("No phone provided")
    }

    /// Rating for display; unrated doctors report 0 and show nothing
    pub fn rating_display(&self) -> Option<String> {
        if self.rating > 0.0 {
            Some(format!("{:.1}", self.rating))
        } else {
            None
        }
    }
}
