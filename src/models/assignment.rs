use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EngineerSummary, ProjectSummary};
use crate::conformance::{AllocationCandidate, DateRange};

/// An engineer committed to a project for a date range.
///
/// Every create, and every update touching `allocation_percentage`, `start_date`
/// or `end_date`, is checked so that the engineer's overlapping allocations stay
/// within their capacity. Deleting an assignment never re-checks the others.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: Uuid,
    pub engineer_id: Uuid,
    pub project_id: Uuid,
    /// Share of the engineer's full-time capacity (0-100).
    pub allocation_percentage: u8,
    pub start_date: NaiveDate,
    /// Strictly after `start_date`.
    pub end_date: NaiveDate,
    /// Free-form label, e.g. "Backend Lead".
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// The candidate describing this assignment as currently stored.
    pub fn as_candidate(&self) -> AllocationCandidate {
        AllocationCandidate {
            id: Some(self.id),
            engineer_id: self.engineer_id,
            range: self.range(),
            allocation_percentage: self.allocation_percentage,
        }
    }
}

/// Input for creating an assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignmentInput {
    pub engineer_id: Uuid,
    pub project_id: Uuid,
    pub allocation_percentage: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub role: String,
}

/// Input for updating an assignment. The engineer and project are fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssignmentInput {
    pub allocation_percentage: Option<u8>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub role: Option<String>,
}

/// An assignment with its engineer and project resolved, used for list responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentDetails {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub engineer: EngineerSummary,
    pub project: ProjectSummary,
}
