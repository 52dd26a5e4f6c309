//! Data structures for authentication-related entities.
//!
//! This module defines models for user roles, JWT claims, the verified
//! session identity and the login form, used for data transfer and internal
//! representation within the authentication flow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Access level of a portal user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Advisor,
    DepartmentOfficer,
    Lecturer,
    ClassLeader,
    Student,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Advisor,
        Role::DepartmentOfficer,
        Role::Lecturer,
        Role::ClassLeader,
        Role::Student,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Advisor => "advisor",
            Role::DepartmentOfficer => "department_officer",
            Role::Lecturer => "lecturer",
            Role::ClassLeader => "class_leader",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Claims carried by the session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub role: Role,
    /// Issued at (unix seconds)
    #[serde(default)]
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Verified caller identity, inserted into request extensions by the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub subject_id: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            role: claims.role,
        }
    }
}

/// Login form payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Protected path to land on after login.
    #[serde(default)]
    pub next: Option<String>,
}
