//! Conformance collaborators backed by SQLite.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::conformance::{AssignmentLookup, CapacityLookup};
use crate::models::Assignment;

/// Reads assignments and capacities through a borrowed connection.
///
/// Pass a transaction to make the lookups part of the same unit of work as the
/// write that follows them.
pub struct SqliteLookup<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteLookup<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl AssignmentLookup for SqliteLookup<'_> {
    fn assignments_for_engineer(
        &self,
        engineer_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Assignment>> {
        super::query_assignments_for_engineer(self.conn, engineer_id, exclude)
    }
}

impl CapacityLookup for SqliteLookup<'_> {
    /// Managers have no capacity and resolve to `None`.
    fn max_capacity(&self, engineer_id: Uuid) -> Result<Option<u8>> {
        let capacity = self
            .conn
            .query_row(
                "SELECT max_capacity FROM users WHERE id = ? AND role = 'engineer'",
                [engineer_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(capacity)
    }
}
