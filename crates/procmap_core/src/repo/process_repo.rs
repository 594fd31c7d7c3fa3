//! Process repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist processes and answer flat, filtered and paginated reads.
//! - Provide the aggregate counts used by delete guards.
//!
//! # Invariants
//! - Flat listings are ordered `created_at ASC, id ASC` unless a query says
//!   otherwise; queries always break ties by `id ASC`.
//! - `parent_id` / `area_id` reference existing rows (foreign keys with
//!   `ON DELETE RESTRICT`): storage never cascades a delete.

use crate::model::area::AreaId;
use crate::model::process::{Process, ProcessId, ProcessType};
use crate::query::{ParentFilter, ProcessQuery};
use crate::repo::sql::{
    contains_pattern, count_to_u64, ensure_connection_ready, offset_value, parse_uuid,
};
use crate::repo::{PageSlice, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PROCESS_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    area_id,
    parent_id,
    tools,
    responsible,
    documentation,
    type,
    created_at,
    updated_at
FROM processes";

/// Repository interface for process persistence.
pub trait ProcessRepository {
    fn insert_process(&self, process: &Process) -> RepoResult<()>;
    fn get_process(&self, id: ProcessId) -> RepoResult<Option<Process>>;
    /// All processes, optionally limited to one area.
    fn list_processes(&self, area_id: Option<AreaId>) -> RepoResult<Vec<Process>>;
    /// Direct children of `parent_id`.
    fn list_children(&self, parent_id: ProcessId) -> RepoResult<Vec<Process>>;
    fn query_processes(&self, query: &ProcessQuery) -> RepoResult<PageSlice<Process>>;
    fn update_process(&self, process: &Process) -> RepoResult<()>;
    fn delete_process(&self, id: ProcessId) -> RepoResult<()>;
    fn count_processes(&self) -> RepoResult<u64>;
    fn count_by_area(&self, area_id: AreaId) -> RepoResult<u64>;
    fn count_children(&self, parent_id: ProcessId) -> RepoResult<u64>;
}

/// SQLite-backed process repository.
#[derive(Clone, Copy)]
pub struct SqliteProcessRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProcessRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["areas", "processes"])?;
        Ok(Self { conn })
    }

    fn collect(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Process>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut processes = Vec::new();
        while let Some(row) = rows.next()? {
            processes.push(parse_process_row(row)?);
        }
        Ok(processes)
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        count_to_u64(total)
    }
}

impl ProcessRepository for SqliteProcessRepository<'_> {
    fn insert_process(&self, process: &Process) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO processes (
                id,
                name,
                description,
                area_id,
                parent_id,
                tools,
                responsible,
                documentation,
                type,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                process.id.to_string(),
                process.name.as_str(),
                process.description.as_deref(),
                process.area_id.to_string(),
                process.parent_id.map(|value| value.to_string()),
                process.tools.as_deref(),
                process.responsible.as_deref(),
                process.documentation.as_deref(),
                process.kind.as_str(),
                process.created_at,
                process.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_process(&self, id: ProcessId) -> RepoResult<Option<Process>> {
        let mut found = self.collect(
            &format!("{PROCESS_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
        )?;
        Ok(found.pop())
    }

    fn list_processes(&self, area_id: Option<AreaId>) -> RepoResult<Vec<Process>> {
        match area_id {
            Some(area_id) => self.collect(
                &format!(
                    "{PROCESS_SELECT_SQL} WHERE area_id = ?1 ORDER BY created_at ASC, id ASC;"
                ),
                [area_id.to_string()],
            ),
            None => self.collect(
                &format!("{PROCESS_SELECT_SQL} ORDER BY created_at ASC, id ASC;"),
                [],
            ),
        }
    }

    fn list_children(&self, parent_id: ProcessId) -> RepoResult<Vec<Process>> {
        self.collect(
            &format!(
                "{PROCESS_SELECT_SQL} WHERE parent_id = ?1 ORDER BY created_at ASC, id ASC;"
            ),
            [parent_id.to_string()],
        )
    }

    fn query_processes(&self, query: &ProcessQuery) -> RepoResult<PageSlice<Process>> {
        let mut filter = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref() {
            filter.push_str(
                " AND (
                    fold_case(name) LIKE ?1 ESCAPE '\\'
                    OR fold_case(COALESCE(description, '')) LIKE ?1 ESCAPE '\\'
                    OR fold_case(COALESCE(tools, '')) LIKE ?1 ESCAPE '\\'
                    OR fold_case(COALESCE(responsible, '')) LIKE ?1 ESCAPE '\\'
                )",
            );
            bind_values.push(Value::Text(contains_pattern(search)));
        }
        if let Some(area_id) = query.area_id {
            push_condition(&mut filter, &mut bind_values, "area_id = ?", area_id.to_string());
        }
        match query.parent {
            ParentFilter::Any => {}
            ParentFilter::Root => filter.push_str(" AND parent_id IS NULL"),
            ParentFilter::Of(parent_id) => push_condition(
                &mut filter,
                &mut bind_values,
                "parent_id = ?",
                parent_id.to_string(),
            ),
        }
        if let Some(kind) = query.kind {
            push_condition(&mut filter, &mut bind_values, "type = ?", kind.as_str().to_string());
        }
        if let Some(responsible) = query.responsible.as_deref() {
            push_condition(
                &mut filter,
                &mut bind_values,
                "responsible = ?",
                responsible.to_string(),
            );
        }

        let total = self.count(
            &format!("SELECT COUNT(*) FROM processes{filter};"),
            params_from_iter(bind_values.iter()),
        )?;

        let next = bind_values.len() + 1;
        let sql = format!(
            "{PROCESS_SELECT_SQL}{filter} ORDER BY {} {}, id ASC LIMIT ?{next} OFFSET ?{};",
            query.sort_by.column(),
            query.sort_order.as_sql(),
            next + 1
        );
        bind_values.push(Value::Integer(i64::from(query.page.limit())));
        bind_values.push(Value::Integer(offset_value(query.page.offset())?));

        let items = self.collect(&sql, params_from_iter(bind_values))?;
        Ok(PageSlice {
            items,
            total_items: total,
        })
    }

    fn update_process(&self, process: &Process) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE processes
             SET
                name = ?2,
                description = ?3,
                area_id = ?4,
                parent_id = ?5,
                tools = ?6,
                responsible = ?7,
                documentation = ?8,
                type = ?9,
                updated_at = ?10
             WHERE id = ?1;",
            params![
                process.id.to_string(),
                process.name.as_str(),
                process.description.as_deref(),
                process.area_id.to_string(),
                process.parent_id.map(|value| value.to_string()),
                process.tools.as_deref(),
                process.responsible.as_deref(),
                process.documentation.as_deref(),
                process.kind.as_str(),
                process.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(process.id));
        }
        Ok(())
    }

    fn delete_process(&self, id: ProcessId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM processes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count_processes(&self) -> RepoResult<u64> {
        self.count("SELECT COUNT(*) FROM processes;", [])
    }

    fn count_by_area(&self, area_id: AreaId) -> RepoResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM processes WHERE area_id = ?1;",
            [area_id.to_string()],
        )
    }

    fn count_children(&self, parent_id: ProcessId) -> RepoResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM processes WHERE parent_id = ?1;",
            [parent_id.to_string()],
        )
    }
}

// Numbered placeholders keep `?1` (search) reusable; each appended condition
// takes the next free index.
fn push_condition(filter: &mut String, bind_values: &mut Vec<Value>, clause: &str, value: String) {
    bind_values.push(Value::Text(value));
    let numbered = clause.replace('?', &format!("?{}", bind_values.len()));
    filter.push_str(" AND ");
    filter.push_str(&numbered);
}

fn parse_process_row(row: &Row<'_>) -> RepoResult<Process> {
    let id_text: String = row.get("id")?;
    let area_text: String = row.get("area_id")?;
    let parent_id = row
        .get::<_, Option<String>>("parent_id")?
        .map(|value| parse_uuid(&value, "processes.parent_id"))
        .transpose()?;

    let type_text: String = row.get("type")?;
    let kind = type_text.parse::<ProcessType>().map_err(|_| {
        RepoError::InvalidData(format!("invalid process type `{type_text}` in processes.type"))
    })?;

    Ok(Process {
        id: parse_uuid(&id_text, "processes.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        area_id: parse_uuid(&area_text, "processes.area_id")?,
        parent_id,
        tools: row.get("tools")?,
        responsible: row.get("responsible")?,
        documentation: row.get("documentation")?,
        kind,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
