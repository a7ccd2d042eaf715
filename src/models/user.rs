use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::timestamp;
use crate::error::{ClientError, Result};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Tutor,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Student, UserRole::Tutor, UserRole::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Tutor => "tutor",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<UserRole> {
        match value.trim() {
            "student" => Some(UserRole::Student),
            "tutor" => Some(UserRole::Tutor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Title-cased name used in menus ("Tutor Login")
    pub fn title(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::Tutor => "Tutor",
            UserRole::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tutor application state.
///
/// ```text
/// pending ──▶ approved
///    │           ▲
///    ▼           │
/// rejected ──────┘
/// ```
///
/// Nothing leaves `approved`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<ApprovalStatus> {
        match value.trim() {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: ApprovalStatus) -> bool {
        matches!(
            (self, next),
            (ApprovalStatus::Pending, ApprovalStatus::Approved)
                | (ApprovalStatus::Pending, ApprovalStatus::Rejected)
                | (ApprovalStatus::Rejected, ApprovalStatus::Approved)
        )
    }

    pub fn transition(self, decision: ApprovalDecision) -> Result<ApprovalStatus> {
        let next = decision.target();
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ClientError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an admin can do to a tutor application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    pub fn target(&self) -> ApprovalStatus {
        match self {
            ApprovalDecision::Approve => ApprovalStatus::Approved,
            ApprovalDecision::Reject => ApprovalStatus::Rejected,
        }
    }

    pub(crate) fn path(&self) -> &'static str {
        match self {
            ApprovalDecision::Approve => "/admin/approve-tutor",
            ApprovalDecision::Reject => "/admin/reject-tutor",
        }
    }
}

/// A user record as listed by the admin endpoints. Password hashes are never sent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub username: String,
    #[serde(rename = "userType")]
    pub role: UserRole,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "timestamp::deserialize"
    )]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, alias = "approvalStatus")]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(rename = "yearsOfExperience", default)]
    pub years_of_experience: Option<u32>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }

    /// "Jan 5, 2024" or "Unknown"
    pub fn joined(&self) -> String {
        timestamp::format_date(self.created_at)
    }
}

/// Extra registration fields a tutor must supply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TutorProfile {
    pub full_name: String,
    pub email: String,
    pub qualification: String,
    pub years_of_experience: Option<u32>,
}
