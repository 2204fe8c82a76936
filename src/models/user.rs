use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capacity granted to engineers who register without one.
pub const DEFAULT_MAX_CAPACITY: u8 = 100;

/// A registered user.
///
/// Both engineers and managers are users. Only engineers are staffed on projects,
/// and only their `max_capacity` is meaningful: it is the *limit* that assignment
/// writes are checked against, never itself subject to an allocation check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub skills: Vec<String>,
    pub seniority: Option<Seniority>,
    /// Percentage points of full-time availability (0-100).
    pub max_capacity: u8,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_engineer(&self) -> bool {
        self.role == UserRole::Engineer
    }

    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }

    /// True when the user lists at least one of `skills`.
    pub fn has_any_skill(&self, skills: &[String]) -> bool {
        self.skills
            .iter()
            .any(|own| skills.iter().any(|s| s.eq_ignore_ascii_case(own)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Engineer,
    Manager,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engineer => "engineer",
            Self::Manager => "manager",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "engineer" => Some(Self::Engineer),
            "manager" => Some(Self::Manager),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "junior" => Some(Self::Junior),
            "mid" => Some(Self::Mid),
            "senior" => Some(Self::Senior),
            _ => None,
        }
    }
}

/// Input for registering a user.
///
/// Credentials are handled by the external identity service; only the profile
/// lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Required for engineers.
    pub seniority: Option<Seniority>,
    /// Defaults to [`DEFAULT_MAX_CAPACITY`].
    pub max_capacity: Option<u8>,
    pub department: Option<String>,
}

/// Profile update. All fields are optional for partial updates.
///
/// Lowering `max_capacity` does not re-check existing assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub seniority: Option<Seniority>,
    pub max_capacity: Option<u8>,
    pub department: Option<String>,
}

/// The slice of an engineer shown alongside assignments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub seniority: Option<Seniority>,
}

impl From<&User> for EngineerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            skills: user.skills.clone(),
            seniority: user.seniority,
        }
    }
}
