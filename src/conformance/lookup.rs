//! Collaborators the conformance engine reads from.

use std::collections::HashMap;

use anyhow::Result;
use uuid::Uuid;

use crate::models::Assignment;

/// Source of an engineer's assignments.
pub trait AssignmentLookup {
    /// All assignments on file for `engineer_id`, minus the one with id `exclude`.
    fn assignments_for_engineer(
        &self,
        engineer_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Assignment>>;
}

/// Source of engineer capacity ceilings.
pub trait CapacityLookup {
    /// `None` when no engineer with this id exists.
    fn max_capacity(&self, engineer_id: Uuid) -> Result<Option<u8>>;
}

/// An in-memory snapshot of assignments.
impl AssignmentLookup for [Assignment] {
    fn assignments_for_engineer(
        &self,
        engineer_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Assignment>> {
        Ok(self
            .iter()
            .filter(|a| a.engineer_id == engineer_id && exclude != Some(a.id))
            .cloned()
            .collect())
    }
}

impl CapacityLookup for HashMap<Uuid, u8> {
    fn max_capacity(&self, engineer_id: Uuid) -> Result<Option<u8>> {
        Ok(self.get(&engineer_id).copied())
    }
}
