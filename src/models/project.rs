use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AssignmentDetails, EngineerSummary};

/// A staffed piece of work.
///
/// Projects have their own lifecycle; the conformance engine reads assignments
/// that point at them but never mutates a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub required_skills: Vec<String>,
    /// Target head count, at least 1.
    pub team_size: u32,
    pub status: ProjectStatus,
    /// The manager who created the project.
    pub manager_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// - `Planning`: Being scoped and staffed (default)
/// - `Active`: Work in progress
/// - `Completed`: Finished
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Input for creating a project. The creating manager becomes `manager_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub team_size: u32,
    /// Defaults to `Planning`.
    pub status: Option<ProjectStatus>,
}

/// Input for updating a project. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub required_skills: Option<Vec<String>>,
    pub team_size: Option<u32>,
    pub status: Option<ProjectStatus>,
}

/// Response for project creation: the project plus engineers whose skills
/// match at least one required skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreated {
    pub project: Project,
    pub suitable_engineers: Vec<EngineerSummary>,
}

/// A project together with the assignments active on it today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub team_allocation: Vec<AssignmentDetails>,
}

/// The slice of a project shown alongside assignments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            status: project.status,
            start_date: project.start_date,
            end_date: project.end_date,
        }
    }
}
