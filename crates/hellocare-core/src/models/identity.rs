use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role carried on the signed-in identity. Unrecognised roles decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Unknown => "unknown",
        }
    }
}

/// The authenticated user, as returned by the login endpoint and persisted
/// under the `user` storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub role: Role,
    /// Any other fields the backend sent, kept so they round-trip through storage
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(user_id: &str, name: &str, email: &str, role: Role) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            extra: Map::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Name for display, falling back to the email address
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}
