use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One assignment as it appears in capacity reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationSlot {
    pub assignment_id: Uuid,
    pub project_id: Uuid,
    pub project_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub allocation: u8,
}

/// An engineer's load as of a given day.
///
/// `allocated_capacity` only counts assignments whose range contains `as_of`;
/// `upcoming` lists everything that has not ended yet, earliest start first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapacityReport {
    pub engineer_id: Uuid,
    pub name: String,
    pub as_of: NaiveDate,
    pub max_capacity: u8,
    pub allocated_capacity: u32,
    /// Negative when the engineer is over-allocated.
    pub available_capacity: i32,
    pub upcoming: Vec<AllocationSlot>,
}

/// An engineer's headroom over a window.
///
/// Every assignment overlapping the window (inclusive at both ends) counts in
/// full, which is the same rule assignment writes are checked with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityReport {
    pub engineer_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_capacity: u8,
    pub available_capacity: i32,
    pub assignments: Vec<AllocationSlot>,
}
