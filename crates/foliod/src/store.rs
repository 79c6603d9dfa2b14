//! CRM store access for the chat cascade.
//!
//! SQLite-backed, read-mostly. Every query the cascade runs is filtered by
//! the owning user id — this is the multi-tenancy boundary and the most
//! important correctness property of the whole subsystem. The insert
//! helpers exist for the CRUD layer seam and for seeding tests; the cascade
//! itself never writes.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use folio_shared::{ClientSummary, LeadSummary, MeetingSummary, ProjectSummary};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Cross-entity record counts for the statistics answer.
#[derive(Debug, Clone, Copy)]
pub struct StatsSummary {
    pub clients: i64,
    pub projects: i64,
    pub meetings: i64,
    pub leads: i64,
}

/// CRM store backed by SQLite
pub struct CrmStore {
    conn: Arc<Mutex<Connection>>,
}

impl CrmStore {
    /// Open or create the store at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (tests, local experiments)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT,
                pitch_status TEXT NOT NULL DEFAULT 'pending',
                user_id TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'started',
                due_date TEXT,
                client_id TEXT,
                user_id TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS meetings (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                scheduled_at TEXT NOT NULL,
                user_id TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS leads (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'new',
                priority TEXT NOT NULL DEFAULT 'medium',
                owner TEXT,
                source TEXT NOT NULL DEFAULT 'other',
                created_at TEXT NOT NULL,
                user_id TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_clients_user ON clients(user_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_meetings_user ON meetings(user_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_leads_user ON leads(user_id)",
            [],
        )?;

        Ok(())
    }

    // ========================================================================
    // Clients
    // ========================================================================

    /// Exact, case-insensitive name match. Anchored equality, not substring:
    /// "Abbas" must not match a client named "Abbas Ali".
    pub fn find_client_by_exact_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<ClientSummary>> {
        let conn = self.conn.lock().unwrap();
        let client = conn
            .query_row(
                "SELECT id, name, address, pitch_status, user_id FROM clients
                 WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE",
                params![user_id, name.trim()],
                row_to_client,
            )
            .optional()?;
        Ok(client)
    }

    pub fn client_name_by_id(&self, user_id: &str, client_id: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let name = conn
            .query_row(
                "SELECT name FROM clients WHERE user_id = ?1 AND id = ?2",
                params![user_id, client_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    pub fn count_clients(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM clients WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_clients_with_status(&self, user_id: &str, status: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM clients WHERE user_id = ?1 AND pitch_status = ?2",
            params![user_id, status],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Capped client list plus the uncapped total, name order.
    pub fn list_clients(&self, user_id: &str, limit: usize) -> Result<(Vec<ClientSummary>, i64)> {
        let total = self.count_clients(user_id)?;
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, address, pitch_status, user_id FROM clients
             WHERE user_id = ?1 ORDER BY name LIMIT ?2",
        )?;
        let clients = stmt
            .query_map(params![user_id, limit as i64], row_to_client)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((clients, total))
    }

    /// Client counts per pitch status, descending by count.
    pub fn clients_status_breakdown(&self, user_id: &str) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT pitch_status, COUNT(*) AS n FROM clients
             WHERE user_id = ?1 GROUP BY pitch_status ORDER BY n DESC, pitch_status",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn insert_client(
        &self,
        user_id: &str,
        name: &str,
        address: Option<&str>,
        pitch_status: &str,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO clients (id, name, address, pitch_status, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, address, pitch_status, user_id],
        )?;
        Ok(id)
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// First project due inside [start, end], both bounds inclusive,
    /// earliest due date first.
    pub fn first_project_due_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<ProjectSummary>> {
        let conn = self.conn.lock().unwrap();
        let project = conn
            .query_row(
                "SELECT id, name, status, due_date, client_id, user_id FROM projects
                 WHERE user_id = ?1 AND due_date IS NOT NULL
                   AND due_date >= ?2 AND due_date <= ?3
                 ORDER BY due_date ASC LIMIT 1",
                params![user_id, start, end],
                row_to_project,
            )
            .optional()?;
        Ok(project)
    }

    /// Capped list of projects due inside [start, end] plus the uncapped total.
    pub fn projects_due_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<(Vec<ProjectSummary>, i64)> {
        let conn = self.conn.lock().unwrap();
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM projects
             WHERE user_id = ?1 AND due_date IS NOT NULL
               AND due_date >= ?2 AND due_date <= ?3",
            params![user_id, start, end],
            |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(
            "SELECT id, name, status, due_date, client_id, user_id FROM projects
             WHERE user_id = ?1 AND due_date IS NOT NULL
               AND due_date >= ?2 AND due_date <= ?3
             ORDER BY due_date ASC LIMIT ?4",
        )?;
        let projects = stmt
            .query_map(params![user_id, start, end, limit as i64], row_to_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((projects, total))
    }

    pub fn count_projects(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM projects WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_projects_with_status(&self, user_id: &str, status: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM projects WHERE user_id = ?1 AND status = ?2",
            params![user_id, status],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn list_projects(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<(Vec<ProjectSummary>, i64)> {
        let total = self.count_projects(user_id)?;
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, status, due_date, client_id, user_id FROM projects
             WHERE user_id = ?1 ORDER BY name LIMIT ?2",
        )?;
        let projects = stmt
            .query_map(params![user_id, limit as i64], row_to_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((projects, total))
    }

    pub fn insert_project(
        &self,
        user_id: &str,
        name: &str,
        status: &str,
        due_date: Option<DateTime<Utc>>,
        client_id: Option<&str>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO projects (id, name, status, due_date, client_id, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, name, status, due_date, client_id, user_id],
        )?;
        Ok(id)
    }

    // ========================================================================
    // Meetings
    // ========================================================================

    pub fn count_meetings(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM meetings WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_meetings_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM meetings
             WHERE user_id = ?1 AND scheduled_at >= ?2 AND scheduled_at <= ?3",
            params![user_id, start, end],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Capped list of meetings at or after `after`, soonest first, plus the
    /// uncapped total of such meetings.
    pub fn upcoming_meetings(
        &self,
        user_id: &str,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<(Vec<MeetingSummary>, i64)> {
        let conn = self.conn.lock().unwrap();
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meetings WHERE user_id = ?1 AND scheduled_at >= ?2",
            params![user_id, after],
            |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(
            "SELECT id, title, scheduled_at, user_id FROM meetings
             WHERE user_id = ?1 AND scheduled_at >= ?2
             ORDER BY scheduled_at ASC LIMIT ?3",
        )?;
        let meetings = stmt
            .query_map(params![user_id, after, limit as i64], row_to_meeting)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((meetings, total))
    }

    pub fn insert_meeting(
        &self,
        user_id: &str,
        title: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO meetings (id, title, scheduled_at, user_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, title, scheduled_at, user_id],
        )?;
        Ok(id)
    }

    // ========================================================================
    // Leads
    // ========================================================================

    pub fn count_leads(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM leads WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_leads_with_status(&self, user_id: &str, status: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM leads WHERE user_id = ?1 AND status = ?2",
            params![user_id, status],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Leads created at or after `cutoff`, counted per source, descending
    /// by count.
    pub fn leads_by_source_since(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT source, COUNT(*) AS n FROM leads
             WHERE user_id = ?1 AND created_at >= ?2
             GROUP BY source ORDER BY n DESC, source",
        )?;
        let rows = stmt
            .query_map(params![user_id, cutoff], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Exact, case-insensitive email match.
    pub fn find_lead_by_email(&self, user_id: &str, email: &str) -> Result<Option<LeadSummary>> {
        let conn = self.conn.lock().unwrap();
        let lead = conn
            .query_row(
                "SELECT id, full_name, email, status, priority, owner, source, created_at, user_id
                 FROM leads WHERE user_id = ?1 AND email = ?2 COLLATE NOCASE",
                params![user_id, email.trim()],
                row_to_lead,
            )
            .optional()?;
        Ok(lead)
    }

    /// Case-insensitive substring match on full name. The needle is escaped
    /// before being embedded in the LIKE pattern so user text cannot smuggle
    /// wildcards in.
    pub fn find_lead_by_name_substring(
        &self,
        user_id: &str,
        needle: &str,
    ) -> Result<Option<LeadSummary>> {
        let pattern = format!("%{}%", escape_like(needle.trim()));
        let conn = self.conn.lock().unwrap();
        let lead = conn
            .query_row(
                "SELECT id, full_name, email, status, priority, owner, source, created_at, user_id
                 FROM leads WHERE user_id = ?1 AND full_name LIKE ?2 ESCAPE '\\'
                 ORDER BY full_name LIMIT 1",
                params![user_id, pattern],
                row_to_lead,
            )
            .optional()?;
        Ok(lead)
    }

    pub fn list_leads(&self, user_id: &str, limit: usize) -> Result<(Vec<LeadSummary>, i64)> {
        let total = self.count_leads(user_id)?;
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, status, priority, owner, source, created_at, user_id
             FROM leads WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let leads = stmt
            .query_map(params![user_id, limit as i64], row_to_lead)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((leads, total))
    }

    /// Lead counts per status, descending by count.
    pub fn leads_status_breakdown(&self, user_id: &str) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) AS n FROM leads
             WHERE user_id = ?1 GROUP BY status ORDER BY n DESC, status",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_lead(
        &self,
        user_id: &str,
        full_name: &str,
        email: &str,
        status: &str,
        priority: &str,
        owner: Option<&str>,
        source: &str,
        created_at: DateTime<Utc>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO leads (id, full_name, email, status, priority, owner, source, created_at, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![id, full_name, email, status, priority, owner, source, created_at, user_id],
        )?;
        Ok(id)
    }

    // ========================================================================
    // Cross-entity
    // ========================================================================

    pub fn stats_summary(&self, user_id: &str) -> Result<StatsSummary> {
        Ok(StatsSummary {
            clients: self.count_clients(user_id)?,
            projects: self.count_projects(user_id)?,
            meetings: self.count_meetings(user_id)?,
            leads: self.count_leads(user_id)?,
        })
    }
}

/// Escape LIKE wildcards in user-supplied text. Pairs with `ESCAPE '\'`.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn row_to_client(row: &Row<'_>) -> rusqlite::Result<ClientSummary> {
    Ok(ClientSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        pitch_status: row.get(3)?,
        user_id: row.get(4)?,
    })
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<ProjectSummary> {
    Ok(ProjectSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        due_date: row.get(3)?,
        client_id: row.get(4)?,
        user_id: row.get(5)?,
    })
}

fn row_to_meeting(row: &Row<'_>) -> rusqlite::Result<MeetingSummary> {
    Ok(MeetingSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        scheduled_at: row.get(2)?,
        user_id: row.get(3)?,
    })
}

fn row_to_lead(row: &Row<'_>) -> rusqlite::Result<LeadSummary> {
    Ok(LeadSummary {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        owner: row.get(5)?,
        source: row.get(6)?,
        created_at: row.get(7)?,
        user_id: row.get(8)?,
    })
}
