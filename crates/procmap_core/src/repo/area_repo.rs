//! Area repository contract and SQLite implementation.
//!
//! # Invariants
//! - `areas.name` is UNIQUE in storage; a racing duplicate insert surfaces as
//!   `RepoError::UniqueViolation` even when the service pre-check passed.
//! - Deleting an area that still owns processes is refused by the
//!   `ON DELETE RESTRICT` foreign key (`RepoError::ForeignKeyViolation`).

use crate::model::area::{Area, AreaId};
use crate::query::AreaQuery;
use crate::repo::sql::{
    contains_pattern, count_to_u64, ensure_connection_ready, offset_value, parse_uuid,
};
use crate::repo::{PageSlice, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const AREA_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    created_at,
    updated_at
FROM areas";

/// Repository interface for area persistence.
pub trait AreaRepository {
    fn insert_area(&self, area: &Area) -> RepoResult<()>;
    fn get_area(&self, id: AreaId) -> RepoResult<Option<Area>>;
    /// Exact, case-sensitive name lookup.
    fn find_area_by_name(&self, name: &str) -> RepoResult<Option<Area>>;
    /// All areas, newest first.
    fn list_areas(&self) -> RepoResult<Vec<Area>>;
    fn query_areas(&self, query: &AreaQuery) -> RepoResult<PageSlice<Area>>;
    fn update_area(&self, area: &Area) -> RepoResult<()>;
    fn delete_area(&self, id: AreaId) -> RepoResult<()>;
    fn count_areas(&self) -> RepoResult<u64>;
}

/// SQLite-backed area repository.
#[derive(Clone, Copy)]
pub struct SqliteAreaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAreaRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["areas"])?;
        Ok(Self { conn })
    }
}

impl AreaRepository for SqliteAreaRepository<'_> {
    fn insert_area(&self, area: &Area) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO areas (id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                area.id.to_string(),
                area.name.as_str(),
                area.description.as_deref(),
                area.created_at,
                area.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_area(&self, id: AreaId) -> RepoResult<Option<Area>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AREA_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_area_row(row)?));
        }
        Ok(None)
    }

    fn find_area_by_name(&self, name: &str) -> RepoResult<Option<Area>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AREA_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_area_row(row)?));
        }
        Ok(None)
    }

    fn list_areas(&self) -> RepoResult<Vec<Area>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AREA_SELECT_SQL} ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut areas = Vec::new();
        while let Some(row) = rows.next()? {
            areas.push(parse_area_row(row)?);
        }
        Ok(areas)
    }

    fn query_areas(&self, query: &AreaQuery) -> RepoResult<PageSlice<Area>> {
        let mut filter = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref() {
            filter.push_str(
                " AND (
                    fold_case(name) LIKE ? ESCAPE '\\'
                    OR fold_case(COALESCE(description, '')) LIKE ? ESCAPE '\\'
                )",
            );
            let pattern = contains_pattern(search);
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }
        if let Some(name) = query.name.as_deref() {
            filter.push_str(" AND fold_case(name) LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(contains_pattern(name)));
        }
        if let Some(description) = query.description.as_deref() {
            filter.push_str(" AND fold_case(COALESCE(description, '')) LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(contains_pattern(description)));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM areas{filter};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{AREA_SELECT_SQL}{filter} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?;",
            query.sort_by.column(),
            query.sort_order.as_sql()
        );
        bind_values.push(Value::Integer(i64::from(query.page.limit())));
        bind_values.push(Value::Integer(offset_value(query.page.offset())?));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_area_row(row)?);
        }

        Ok(PageSlice {
            items,
            total_items: count_to_u64(total)?,
        })
    }

    fn update_area(&self, area: &Area) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE areas
             SET
                name = ?2,
                description = ?3,
                updated_at = ?4
             WHERE id = ?1;",
            params![
                area.id.to_string(),
                area.name.as_str(),
                area.description.as_deref(),
                area.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(area.id));
        }
        Ok(())
    }

    fn delete_area(&self, id: AreaId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM areas WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count_areas(&self) -> RepoResult<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM areas;", [], |row| row.get(0))?;
        count_to_u64(total)
    }
}

fn parse_area_row(row: &Row<'_>) -> RepoResult<Area> {
    let id_text: String = row.get("id")?;
    Ok(Area {
        id: parse_uuid(&id_text, "areas.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
