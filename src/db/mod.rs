mod lookup;
mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Params, Row, TransactionBehavior};
use uuid::Uuid;

use crate::conformance::{
    allocated_on, check_fields, compute_available_capacity, AllocationCandidate,
    ConformanceEngine, ConformanceResult, DateRange,
};
use crate::error::DomainError;
use crate::models::*;

pub use lookup::SqliteLookup;

const USER_COLUMNS: &str =
    "id, email, name, role, skills, seniority, max_capacity, department, created_at, updated_at";

const PROJECT_COLUMNS: &str = "id, name, description, start_date, end_date, required_skills, \
     team_size, status, manager_id, created_at, updated_at";

const ASSIGNMENT_COLUMNS: &str = "id, engineer_id, project_id, allocation_percentage, \
     start_date, end_date, role, created_at, updated_at";

/// Assignment columns (prefixed `a.`) followed by the engineer and project
/// summary columns, in the order [`details_from_row`] reads them.
const DETAILS_SELECT: &str = "SELECT a.id, a.engineer_id, a.project_id, a.allocation_percentage,
            a.start_date, a.end_date, a.role, a.created_at, a.updated_at,
            u.id, u.name, u.email, u.skills, u.seniority,
            p.id, p.name, p.description, p.status, p.start_date, p.end_date
     FROM assignments a
     JOIN users u ON u.id = a.engineer_id
     JOIN projects p ON p.id = a.project_id";

/// Handle to the SQLite store. Cheap to clone; all clones share one connection.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        tracing::debug!("Opened database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "capacity-planner")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("capacity-planner.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    // ============================================================
    // User operations
    // ============================================================

    pub fn create_user(&self, input: CreateUserInput) -> Result<User> {
        let email = input.email.trim().to_lowercase();
        let name = required_text(&input.name, "Name")?;
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::invalid("A valid email is required").into());
        }
        if input.role == UserRole::Engineer && input.seniority.is_none() {
            return Err(DomainError::invalid("Seniority is required for engineers").into());
        }
        let max_capacity = input.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY);
        check_capacity(max_capacity)?;

        let conn = self.lock()?;
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
            [&email],
            |row| row.get(0),
        )?;
        if taken {
            return Err(DomainError::Conflict("Email is already registered".to_string()).into());
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let skills = normalize_skills(input.skills);
        let department = optional_text(input.department);

        conn.execute(
            "INSERT INTO users (id, email, name, role, skills, seniority, max_capacity,
                 department, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &email,
                &name,
                input.role.as_str(),
                serde_json::to_string(&skills)?,
                input.seniority.map(|s| s.as_str()),
                max_capacity,
                &department,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        tracing::info!(user_id = %id, role = input.role.as_str(), "Registered user");

        Ok(User {
            id,
            email,
            name,
            role: input.role,
            skills,
            seniority: input.seniority,
            max_capacity,
            department,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.lock()?;
        query_user(&conn, id)
    }

    /// Like [`Database::get_user`], but `None` for managers.
    pub fn get_engineer(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.get_user(id)?.filter(User::is_engineer))
    }

    pub fn get_engineers(&self) -> Result<Vec<User>> {
        let conn = self.lock()?;
        query_engineers(&conn)
    }

    /// Engineers listing at least one of `skills` (case-insensitive).
    pub fn search_engineers_by_skills(&self, skills: &[String]) -> Result<Vec<User>> {
        let skills = normalize_skills(skills.to_vec());
        Ok(self
            .get_engineers()?
            .into_iter()
            .filter(|e| e.has_any_skill(&skills))
            .collect())
    }

    /// Profile update. Capacity changes never re-check existing assignments.
    pub fn update_user(&self, id: Uuid, input: UpdateUserInput) -> Result<Option<User>> {
        let conn = self.lock()?;
        let Some(existing) = query_user(&conn, id)? else {
            return Ok(None);
        };

        let name = match input.name {
            Some(name) => required_text(&name, "Name")?,
            None => existing.name,
        };
        let max_capacity = input.max_capacity.unwrap_or(existing.max_capacity);
        check_capacity(max_capacity)?;
        let skills = input.skills.map(normalize_skills).unwrap_or(existing.skills);
        let seniority = input.seniority.or(existing.seniority);
        let department = optional_text(input.department).or(existing.department);
        let now = Utc::now();

        conn.execute(
            "UPDATE users SET name = ?, skills = ?, seniority = ?, max_capacity = ?,
                    department = ?, updated_at = ?
             WHERE id = ?",
            (
                &name,
                serde_json::to_string(&skills)?,
                seniority.map(|s| s.as_str()),
                max_capacity,
                &department,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(User {
            id,
            email: existing.email,
            name,
            role: existing.role,
            skills,
            seniority,
            max_capacity,
            department,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>> {
        let conn = self.lock()?;
        let projects = match status {
            Some(status) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects WHERE status = ?
                     ORDER BY start_date, name"
                ))?;
                let rows = stmt
                    .query_map([status.as_str()], project_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY start_date, name"
                ))?;
                let rows = stmt
                    .query_map([], project_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(projects)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.lock()?;
        query_project(&conn, id)
    }

    /// The project plus assignments whose range contains `as_of`.
    pub fn get_project_details(
        &self,
        id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Option<ProjectDetails>> {
        let conn = self.lock()?;
        let Some(project) = query_project(&conn, id)? else {
            return Ok(None);
        };

        let team_allocation = query_assignment_details(
            &conn,
            "WHERE a.project_id = ? AND a.start_date <= ? AND a.end_date >= ?",
            (id.to_string(), as_of, as_of),
        )?;

        Ok(Some(ProjectDetails {
            project,
            team_allocation,
        }))
    }

    /// Create a project owned by `manager_id` and suggest engineers for it.
    pub fn create_project(
        &self,
        manager_id: Uuid,
        input: CreateProjectInput,
    ) -> Result<ProjectCreated> {
        let name = required_text(&input.name, "Name")?;
        let description = required_text(&input.description, "Description")?;
        check_project_range(input.start_date, input.end_date)?;
        check_team_size(input.team_size)?;

        let conn = self.lock()?;
        query_user(&conn, manager_id)?
            .filter(User::is_manager)
            .ok_or(DomainError::NotFound("Manager"))?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = input.status.unwrap_or_default();
        let required_skills = normalize_skills(input.required_skills);

        conn.execute(
            "INSERT INTO projects (id, name, description, start_date, end_date, required_skills,
                 team_size, status, manager_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &name,
                &description,
                input.start_date,
                input.end_date,
                serde_json::to_string(&required_skills)?,
                input.team_size,
                status.as_str(),
                manager_id.to_string(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        let suitable_engineers = query_engineers(&conn)?
            .iter()
            .filter(|e| e.has_any_skill(&required_skills))
            .map(EngineerSummary::from)
            .collect();

        tracing::info!(project_id = %id, %manager_id, "Created project");

        Ok(ProjectCreated {
            project: Project {
                id,
                name,
                description,
                start_date: input.start_date,
                end_date: input.end_date,
                required_skills,
                team_size: input.team_size,
                status,
                manager_id,
                created_at: now,
                updated_at: now,
            },
            suitable_engineers,
        })
    }

    pub fn update_project(&self, id: Uuid, input: UpdateProjectInput) -> Result<Option<Project>> {
        let conn = self.lock()?;
        let Some(existing) = query_project(&conn, id)? else {
            return Ok(None);
        };

        let name = match input.name {
            Some(name) => required_text(&name, "Name")?,
            None => existing.name,
        };
        let description = match input.description {
            Some(description) => required_text(&description, "Description")?,
            None => existing.description,
        };
        let start_date = input.start_date.unwrap_or(existing.start_date);
        let end_date = input.end_date.unwrap_or(existing.end_date);
        check_project_range(start_date, end_date)?;
        let team_size = input.team_size.unwrap_or(existing.team_size);
        check_team_size(team_size)?;
        let required_skills = input
            .required_skills
            .map(normalize_skills)
            .unwrap_or(existing.required_skills);
        let status = input.status.unwrap_or(existing.status);
        let now = Utc::now();

        conn.execute(
            "UPDATE projects SET name = ?, description = ?, start_date = ?, end_date = ?,
                    required_skills = ?, team_size = ?, status = ?, updated_at = ?
             WHERE id = ?",
            (
                &name,
                &description,
                start_date,
                end_date,
                serde_json::to_string(&required_skills)?,
                team_size,
                status.as_str(),
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Project {
            id,
            name,
            description,
            start_date,
            end_date,
            required_skills,
            team_size,
            status,
            manager_id: existing.manager_id,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    /// Deletes the project and, by cascade, its assignments.
    pub fn delete_project(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Assignment operations
    // ============================================================

    pub fn get_all_assignments(&self) -> Result<Vec<AssignmentDetails>> {
        let conn = self.lock()?;
        query_assignment_details(&conn, "", [])
    }

    pub fn get_assignments_by_engineer(&self, engineer_id: Uuid) -> Result<Vec<AssignmentDetails>> {
        let conn = self.lock()?;
        query_assignment_details(&conn, "WHERE a.engineer_id = ?", [engineer_id.to_string()])
    }

    pub fn get_assignments_by_project(&self, project_id: Uuid) -> Result<Vec<AssignmentDetails>> {
        let conn = self.lock()?;
        query_assignment_details(&conn, "WHERE a.project_id = ?", [project_id.to_string()])
    }

    pub fn get_assignment(&self, id: Uuid) -> Result<Option<AssignmentDetails>> {
        let conn = self.lock()?;
        query_single_details(&conn, id)
    }

    /// Create an assignment after checking it against the engineer's capacity.
    ///
    /// Lookup, check and insert run in one immediate transaction while the
    /// connection lock is held, so concurrent writers cannot both pass the check
    /// on the same stale snapshot.
    pub fn create_assignment(&self, input: CreateAssignmentInput) -> Result<AssignmentDetails> {
        let candidate = AllocationCandidate {
            id: None,
            engineer_id: input.engineer_id,
            range: DateRange::new(input.start_date, input.end_date),
            allocation_percentage: input.allocation_percentage,
        };
        check_fields(&candidate)?;
        let role = required_text(&input.role, "Role")?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        query_user(&tx, input.engineer_id)?
            .filter(User::is_engineer)
            .ok_or(DomainError::NotFound("Engineer"))?;
        query_project(&tx, input.project_id)?.ok_or(DomainError::NotFound("Project"))?;

        enforce_capacity(&tx, &candidate)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        tx.execute(
            "INSERT INTO assignments (id, engineer_id, project_id, allocation_percentage,
                 start_date, end_date, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.engineer_id.to_string(),
                input.project_id.to_string(),
                input.allocation_percentage,
                input.start_date,
                input.end_date,
                &role,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        let details = query_single_details(&tx, id)?
            .ok_or_else(|| anyhow::anyhow!("Assignment {} vanished after insert", id))?;
        tx.commit()?;

        tracing::info!(
            assignment_id = %id,
            engineer_id = %input.engineer_id,
            project_id = %input.project_id,
            allocation = input.allocation_percentage,
            "Created assignment"
        );
        Ok(details)
    }

    /// Apply a partial update.
    ///
    /// Field rules always run. The capacity check only runs when the allocation
    /// or dates actually change; a role-only edit skips it.
    pub fn update_assignment(
        &self,
        id: Uuid,
        input: UpdateAssignmentInput,
    ) -> Result<Option<AssignmentDetails>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(existing) = query_assignment(&tx, id)? else {
            return Ok(None);
        };

        let candidate = AllocationCandidate {
            id: Some(id),
            engineer_id: existing.engineer_id,
            range: DateRange::new(
                input.start_date.unwrap_or(existing.start_date),
                input.end_date.unwrap_or(existing.end_date),
            ),
            allocation_percentage: input
                .allocation_percentage
                .unwrap_or(existing.allocation_percentage),
        };
        check_fields(&candidate)?;
        let role = match input.role {
            Some(role) => required_text(&role, "Role")?,
            None => existing.role.clone(),
        };

        if candidate != existing.as_candidate() {
            enforce_capacity(&tx, &candidate)?;
        }

        tx.execute(
            "UPDATE assignments SET allocation_percentage = ?, start_date = ?, end_date = ?,
                    role = ?, updated_at = ?
             WHERE id = ?",
            (
                candidate.allocation_percentage,
                candidate.range.start,
                candidate.range.end,
                &role,
                Utc::now().to_rfc3339(),
                id.to_string(),
            ),
        )?;

        let details = query_single_details(&tx, id)?;
        tx.commit()?;

        tracing::info!(assignment_id = %id, "Updated assignment");
        Ok(details)
    }

    /// Removes one assignment. Other assignments are not re-checked.
    pub fn delete_assignment(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM assignments WHERE id = ?", [id.to_string()])?;
        if rows > 0 {
            tracing::info!(assignment_id = %id, "Deleted assignment");
        }
        Ok(rows > 0)
    }

    // ============================================================
    // Capacity reporting
    // ============================================================

    /// Load as of `as_of`, plus every assignment that has not ended by then.
    pub fn get_capacity_report(
        &self,
        engineer_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Option<CapacityReport>> {
        let conn = self.lock()?;
        let Some(engineer) = query_user(&conn, engineer_id)?.filter(User::is_engineer) else {
            return Ok(None);
        };
        let assignments =
            query_assignment_details(&conn, "WHERE a.engineer_id = ?", [engineer_id.to_string()])?;
        Ok(Some(capacity_report(&engineer, as_of, &assignments)))
    }

    /// One report per engineer, ordered by name.
    pub fn get_all_capacity_reports(&self, as_of: NaiveDate) -> Result<Vec<CapacityReport>> {
        let conn = self.lock()?;
        let engineers = query_engineers(&conn)?;
        let assignments = query_assignment_details(&conn, "", [])?;

        Ok(engineers
            .iter()
            .map(|engineer| {
                let own: Vec<AssignmentDetails> = assignments
                    .iter()
                    .filter(|d| d.assignment.engineer_id == engineer.id)
                    .cloned()
                    .collect();
                capacity_report(engineer, as_of, &own)
            })
            .collect())
    }

    /// Headroom over `window`: every assignment overlapping it counts in full.
    pub fn get_availability(
        &self,
        engineer_id: Uuid,
        window: DateRange,
    ) -> Result<Option<AvailabilityReport>> {
        if window.end < window.start {
            return Err(DomainError::invalid("End date must not be before start date").into());
        }

        let conn = self.lock()?;
        let Some(engineer) = query_user(&conn, engineer_id)?.filter(User::is_engineer) else {
            return Ok(None);
        };

        let overlapping: Vec<AssignmentDetails> =
            query_assignment_details(&conn, "WHERE a.engineer_id = ?", [engineer_id.to_string()])?
                .into_iter()
                .filter(|d| d.assignment.range().overlaps(&window))
                .collect();
        let allocated: u32 = overlapping
            .iter()
            .map(|d| u32::from(d.assignment.allocation_percentage))
            .sum();

        Ok(Some(AvailabilityReport {
            engineer_id,
            name: engineer.name,
            start_date: window.start,
            end_date: window.end,
            max_capacity: engineer.max_capacity,
            available_capacity: i32::from(engineer.max_capacity) - allocated as i32,
            assignments: overlapping.iter().map(allocation_slot).collect(),
        }))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

// ============================================================
// Queries shared by the public operations
// ============================================================

/// Run the conformance engine against `conn` and turn a rejection into an error.
fn enforce_capacity(conn: &Connection, candidate: &AllocationCandidate) -> Result<()> {
    let lookup = SqliteLookup::new(conn);
    let outcome = ConformanceEngine::new(&lookup, &lookup).check(candidate)?;
    if let ConformanceResult::Rejected {
        total,
        capacity,
        ref conflicts,
    } = outcome
    {
        tracing::warn!(
            engineer_id = %candidate.engineer_id,
            total,
            capacity,
            conflicts = conflicts.len(),
            "Rejected assignment: capacity exceeded"
        );
    }
    outcome.into_result()?;
    Ok(())
}

fn query_user(conn: &Connection, id: Uuid) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
            [id.to_string()],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

fn query_engineers(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = 'engineer' ORDER BY name"
    ))?;
    let engineers = stmt
        .query_map([], user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(engineers)
}

fn query_project(conn: &Connection, id: Uuid) -> Result<Option<Project>> {
    let project = conn
        .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"),
            [id.to_string()],
            project_from_row,
        )
        .optional()?;
    Ok(project)
}

fn query_assignment(conn: &Connection, id: Uuid) -> Result<Option<Assignment>> {
    let assignment = conn
        .query_row(
            &format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?"),
            [id.to_string()],
            assignment_from_row,
        )
        .optional()?;
    Ok(assignment)
}

pub(crate) fn query_assignments_for_engineer(
    conn: &Connection,
    engineer_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<Vec<Assignment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
         WHERE engineer_id = ? AND id IS NOT ?
         ORDER BY start_date"
    ))?;
    let assignments = stmt
        .query_map(
            (engineer_id.to_string(), exclude.map(|id| id.to_string())),
            assignment_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(assignments)
}

fn query_assignment_details<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Vec<AssignmentDetails>> {
    let mut stmt = conn.prepare(&format!(
        "{DETAILS_SELECT} {filter} ORDER BY a.start_date, a.created_at"
    ))?;
    let details = stmt
        .query_map(params, details_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(details)
}

fn query_single_details(conn: &Connection, id: Uuid) -> Result<Option<AssignmentDetails>> {
    Ok(query_assignment_details(conn, "WHERE a.id = ?", [id.to_string()])?
        .into_iter()
        .next())
}

// ============================================================
// Row mapping
// ============================================================

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row.get::<_, String>(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        role: UserRole::from_str(&row.get::<_, String>(3)?).unwrap_or(UserRole::Engineer),
        skills: parse_list(row.get::<_, String>(4)?),
        seniority: row
            .get::<_, Option<String>>(5)?
            .and_then(|s| Seniority::from_str(&s)),
        max_capacity: row.get(6)?,
        department: row.get(7)?,
        created_at: parse_datetime(row.get::<_, String>(8)?),
        updated_at: parse_datetime(row.get::<_, String>(9)?),
    })
}

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        required_skills: parse_list(row.get::<_, String>(5)?),
        team_size: row.get(6)?,
        status: ProjectStatus::from_str(&row.get::<_, String>(7)?).unwrap_or_default(),
        manager_id: parse_uuid(row.get::<_, String>(8)?),
        created_at: parse_datetime(row.get::<_, String>(9)?),
        updated_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn assignment_from_row(row: &Row) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: parse_uuid(row.get::<_, String>(0)?),
        engineer_id: parse_uuid(row.get::<_, String>(1)?),
        project_id: parse_uuid(row.get::<_, String>(2)?),
        allocation_percentage: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        role: row.get(6)?,
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn details_from_row(row: &Row) -> rusqlite::Result<AssignmentDetails> {
    Ok(AssignmentDetails {
        assignment: assignment_from_row(row)?,
        engineer: EngineerSummary {
            id: parse_uuid(row.get::<_, String>(9)?),
            name: row.get(10)?,
            email: row.get(11)?,
            skills: parse_list(row.get::<_, String>(12)?),
            seniority: row
                .get::<_, Option<String>>(13)?
                .and_then(|s| Seniority::from_str(&s)),
        },
        project: ProjectSummary {
            id: parse_uuid(row.get::<_, String>(14)?),
            name: row.get(15)?,
            description: row.get(16)?,
            status: ProjectStatus::from_str(&row.get::<_, String>(17)?).unwrap_or_default(),
            start_date: row.get(18)?,
            end_date: row.get(19)?,
        },
    })
}

// ============================================================
// Report assembly and field rules
// ============================================================

fn capacity_report(
    engineer: &User,
    as_of: NaiveDate,
    assignments: &[AssignmentDetails],
) -> CapacityReport {
    let plain: Vec<Assignment> = assignments.iter().map(|d| d.assignment.clone()).collect();

    CapacityReport {
        engineer_id: engineer.id,
        name: engineer.name.clone(),
        as_of,
        max_capacity: engineer.max_capacity,
        allocated_capacity: allocated_on(engineer.id, as_of, &plain),
        available_capacity: compute_available_capacity(
            engineer.id,
            engineer.max_capacity,
            as_of,
            &plain,
        ),
        upcoming: assignments
            .iter()
            .filter(|d| d.assignment.end_date >= as_of)
            .map(allocation_slot)
            .collect(),
    }
}

fn allocation_slot(details: &AssignmentDetails) -> AllocationSlot {
    AllocationSlot {
        assignment_id: details.assignment.id,
        project_id: details.project.id,
        project_name: details.project.name.clone(),
        start_date: details.assignment.start_date,
        end_date: details.assignment.end_date,
        allocation: details.assignment.allocation_percentage,
    }
}

fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid(format!("{} is required", field)).into());
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn check_capacity(max_capacity: u8) -> Result<()> {
    if max_capacity > 100 {
        return Err(DomainError::invalid("Max capacity must be between 0 and 100").into());
    }
    Ok(())
}

fn check_project_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if !DateRange::new(start, end).is_valid() {
        return Err(DomainError::invalid("End date must be after start date").into());
    }
    Ok(())
}

fn check_team_size(team_size: u32) -> Result<()> {
    if team_size < 1 {
        return Err(DomainError::invalid("Team size must be at least 1").into());
    }
    Ok(())
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_list(json: String) -> Vec<String> {
    serde_json::from_str(&json).unwrap_or_default()
}
