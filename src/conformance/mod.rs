//! Capacity conformance: decides whether an assignment can be committed without
//! pushing its engineer past their capacity.
//!
//! The decision itself ([`validate_assignment`]) is a pure function over a snapshot
//! of the engineer's other assignments. [`ConformanceEngine`] wires that function
//! to its two collaborators, an [`AssignmentLookup`] and a [`CapacityLookup`],
//! which are passed in explicitly rather than resolved globally.
//!
//! # Overlap rule
//!
//! Two ranges overlap when `s1 <= e2 && e1 >= s2`. Both ends are inclusive, so an
//! assignment ending on the day another starts still counts against it.
//!
//! # Limitations
//!
//! Only the candidate is checked, and only as a single sum over everything that
//! overlaps its own range. Two existing assignments that never overlap each other
//! but both overlap the candidate are summed together; other assignments are not
//! re-verified after the candidate is written.

mod lookup;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Assignment;

pub use lookup::*;

/// Upper bound for a single assignment's allocation.
pub const MAX_ALLOCATION_PERCENTAGE: u8 = 100;

/// A closed range of calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Field-level rule for assignments and projects: the end must come after the start.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Inclusive at both ends: a shared boundary day counts as overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// The assignment being created, or the post-edit state of one being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationCandidate {
    /// `None` for a new assignment. For an update, the stored assignment with this
    /// id is never counted against the candidate.
    pub id: Option<Uuid>,
    pub engineer_id: Uuid,
    pub range: DateRange,
    pub allocation_percentage: u8,
}

/// Errors raised while deciding whether an assignment conforms.
#[derive(Debug, Error, PartialEq)]
pub enum ConformanceError {
    #[error("End date must be after start date")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Allocation percentage must be between 0 and 100 (got {0})")]
    AllocationOutOfRange(u8),

    #[error(
        "Total allocation of {requested}% exceeds engineer's capacity of {capacity}% during this period"
    )]
    CapacityExceeded {
        requested: u32,
        capacity: u8,
        conflicts: Vec<Assignment>,
    },

    #[error("Engineer not found")]
    EngineerNotFound(Uuid),
}

/// Outcome of [`validate_assignment`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConformanceResult {
    Accepted {
        /// Candidate plus everything overlapping it.
        total: u32,
    },
    Rejected {
        total: u32,
        capacity: u8,
        /// Every overlapping assignment, not only those that tipped the sum over.
        conflicts: Vec<Assignment>,
    },
}

impl ConformanceResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn conflicts(&self) -> &[Assignment] {
        match self {
            Self::Accepted { .. } => &[],
            Self::Rejected { conflicts, .. } => conflicts,
        }
    }

    /// Turn a rejection into [`ConformanceError::CapacityExceeded`].
    pub fn into_result(self) -> Result<u32, ConformanceError> {
        match self {
            Self::Accepted { total } => Ok(total),
            Self::Rejected {
                total,
                capacity,
                conflicts,
            } => Err(ConformanceError::CapacityExceeded {
                requested: total,
                capacity,
                conflicts,
            }),
        }
    }
}

/// Field-level checks that run before any lookup.
pub fn check_fields(candidate: &AllocationCandidate) -> Result<(), ConformanceError> {
    if !candidate.range.is_valid() {
        return Err(ConformanceError::InvalidRange {
            start: candidate.range.start,
            end: candidate.range.end,
        });
    }
    if candidate.allocation_percentage > MAX_ALLOCATION_PERCENTAGE {
        return Err(ConformanceError::AllocationOutOfRange(
            candidate.allocation_percentage,
        ));
    }
    Ok(())
}

/// Decide whether `candidate` fits within `max_capacity`.
///
/// `existing` should hold the engineer's other assignments. Records belonging to a
/// different engineer, or sharing the candidate's id, are ignored.
pub fn validate_assignment(
    candidate: &AllocationCandidate,
    existing: &[Assignment],
    max_capacity: u8,
) -> ConformanceResult {
    let overlapping: Vec<Assignment> = existing
        .iter()
        .filter(|a| a.engineer_id == candidate.engineer_id)
        .filter(|a| candidate.id != Some(a.id))
        .filter(|a| a.range().overlaps(&candidate.range))
        .cloned()
        .collect();

    let total = overlapping
        .iter()
        .map(|a| u32::from(a.allocation_percentage))
        .sum::<u32>()
        + u32::from(candidate.allocation_percentage);

    if total <= u32::from(max_capacity) {
        ConformanceResult::Accepted { total }
    } else {
        ConformanceResult::Rejected {
            total,
            capacity: max_capacity,
            conflicts: overlapping,
        }
    }
}

/// Sum of allocations active on `as_of` (inclusive at both ends) for one engineer.
pub fn allocated_on(engineer_id: Uuid, as_of: NaiveDate, assignments: &[Assignment]) -> u32 {
    assignments
        .iter()
        .filter(|a| a.engineer_id == engineer_id && a.range().contains(as_of))
        .map(|a| u32::from(a.allocation_percentage))
        .sum()
}

/// Capacity left on `as_of`. Negative when the engineer is over-allocated.
pub fn compute_available_capacity(
    engineer_id: Uuid,
    max_capacity: u8,
    as_of: NaiveDate,
    assignments: &[Assignment],
) -> i32 {
    i32::from(max_capacity) - allocated_on(engineer_id, as_of, assignments) as i32
}

/// Runs the conformance check against injected collaborators.
pub struct ConformanceEngine<'a, A: ?Sized, C: ?Sized> {
    assignments: &'a A,
    capacities: &'a C,
}

impl<'a, A, C> ConformanceEngine<'a, A, C>
where
    A: AssignmentLookup + ?Sized,
    C: CapacityLookup + ?Sized,
{
    pub fn new(assignments: &'a A, capacities: &'a C) -> Self {
        Self {
            assignments,
            capacities,
        }
    }

    /// Field checks, then lookups, then [`validate_assignment`].
    ///
    /// Returns `Err` for field violations, a missing engineer, or a lookup
    /// failure. A capacity rejection is an `Ok(ConformanceResult::Rejected)`.
    pub fn check(&self, candidate: &AllocationCandidate) -> anyhow::Result<ConformanceResult> {
        check_fields(candidate)?;

        let max_capacity = self
            .capacities
            .max_capacity(candidate.engineer_id)?
            .ok_or(ConformanceError::EngineerNotFound(candidate.engineer_id))?;

        let existing = self
            .assignments
            .assignments_for_engineer(candidate.engineer_id, candidate.id)?;

        let result = validate_assignment(candidate, &existing, max_capacity);
        if let ConformanceResult::Rejected {
            total, conflicts, ..
        } = &result
        {
            tracing::debug!(
                engineer_id = %candidate.engineer_id,
                total,
                max_capacity,
                conflicts = conflicts.len(),
                "Assignment exceeds capacity"
            );
        }
        Ok(result)
    }
}
