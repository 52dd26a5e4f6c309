//! Wire models for the `adapters` crate.
//!
//! These models mirror the JSON shapes served by the external REST backend
//! (faculties, classes, identity, login) so the front tier can work with a
//! consistent, typed representation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub faculty_abbr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub faculty_id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohort: Option<String>,
}

/// Identity as reported by `GET /api/auth/me`.
///
/// The role is kept as the raw string; interpreting it is the caller's job.
/// The subject is read from `subject_id`, then `user_id`, then `id`; the
/// other keys may appear alongside it as ordinary user-record fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "IdentityFields")]
pub struct RemoteIdentity {
    pub role: String,
    pub subject_id: String,
}

#[derive(Deserialize)]
struct IdentityFields {
    role: String,
    #[serde(default, deserialize_with = "optional_id")]
    subject_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    id: Option<String>,
}

impl TryFrom<IdentityFields> for RemoteIdentity {
    type Error = String;

    fn try_from(fields: IdentityFields) -> Result<Self, Self::Error> {
        let subject_id = fields
            .subject_id
            .or(fields.user_id)
            .or(fields.id)
            .ok_or_else(|| "identity carries no subject_id, user_id or id".to_string())?;
        Ok(Self {
            role: fields.role,
            subject_id,
        })
    }
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FacultiesEnvelope {
    pub faculties: Vec<Faculty>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassesEnvelope {
    pub classes: Vec<Class>,
}

/// Login request payload forwarded to the backend
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Signed session credential returned by a successful login
#[derive(Debug, Clone, Deserialize)]
pub struct IssuedToken {
    pub token: String,
}
