//! Extender repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the `save`/`delete` hooks for both extender variants.
//! - Serve kind-specific lookups for permission checks.
//!
//! # Invariants
//! - Each variant reads and writes only its own table.
//! - Payloads are persisted raw, next to their stored value-type tag.
//! - `name`, `entity_guid` and `owner_guid` are never updated after insert.

use crate::db::DbError;
use crate::model::extender::{Extender, ExtenderKind, StoredExtender};
use crate::permission::ExtenderLookup;
use chrono::Utc;
use log::{info, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EXTENDER_COLUMNS: &str =
    "id, entity_guid, owner_guid, name, value, value_type, time_created";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for extender persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { kind: ExtenderKind, id: i64 },
    MissingId,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::MissingId => write!(f, "extender has not been saved yet"),
            Self::InvalidData(message) => write!(f, "invalid extender data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::MissingId | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence hooks shared by annotation and metadata variants.
pub trait ExtenderRepository {
    /// Inserts an unsaved extender (assigning `id` and `time_created`) or
    /// updates the payload of a saved one. Returns the extender id.
    fn save(&self, extender: &mut Extender) -> RepoResult<i64>;
    fn delete(&self, kind: ExtenderKind, id: i64) -> RepoResult<()>;
    fn get(&self, kind: ExtenderKind, id: i64) -> RepoResult<Option<Extender>>;
    fn list_for_entity(&self, kind: ExtenderKind, entity_guid: i64) -> RepoResult<Vec<Extender>>;
}

/// SQLite-backed extender repository.
pub struct SqliteExtenderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExtenderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert(&self, extender: &mut Extender) -> RepoResult<i64> {
        let kind = extender.kind();
        let time_created = extender
            .time_created()
            .unwrap_or_else(|| Utc::now().timestamp());

        self.conn.execute(
            &format!(
                "INSERT INTO {} (entity_guid, owner_guid, name, value, value_type, time_created)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                kind.table_name()
            ),
            params![
                extender.entity_guid(),
                extender.owner_guid(),
                extender.name(),
                extender.raw_value().to_string(),
                extender.value_type().as_str(),
                time_created,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        extender.assign_persisted(id, time_created);
        info!(
            "event=extender_save module=repo status=ok op=insert kind={kind} id={id} entity_guid={}",
            extender.entity_guid()
        );
        Ok(id)
    }

    fn update(&self, extender: &Extender, id: i64) -> RepoResult<i64> {
        let kind = extender.kind();
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET value = ?1, value_type = ?2 WHERE id = ?3;",
                kind.table_name()
            ),
            params![
                extender.raw_value().to_string(),
                extender.value_type().as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { kind, id });
        }
        info!("event=extender_save module=repo status=ok op=update kind={kind} id={id}");
        Ok(id)
    }
}

impl ExtenderRepository for SqliteExtenderRepository<'_> {
    fn save(&self, extender: &mut Extender) -> RepoResult<i64> {
        if extender.name().trim().is_empty() {
            return Err(RepoError::InvalidData(
                "extender name must not be empty".to_string(),
            ));
        }
        match extender.id() {
            Some(id) => self.update(extender, id),
            None => self.insert(extender),
        }
    }

    fn delete(&self, kind: ExtenderKind, id: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", kind.table_name()),
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind, id });
        }
        info!("event=extender_delete module=repo status=ok kind={kind} id={id}");
        Ok(())
    }

    fn get(&self, kind: ExtenderKind, id: i64) -> RepoResult<Option<Extender>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXTENDER_COLUMNS} FROM {} WHERE id = ?1;",
            kind.table_name()
        ))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_extender_row(kind, row)?));
        }
        Ok(None)
    }

    fn list_for_entity(&self, kind: ExtenderKind, entity_guid: i64) -> RepoResult<Vec<Extender>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXTENDER_COLUMNS} FROM {} WHERE entity_guid = ?1 ORDER BY id ASC;",
            kind.table_name()
        ))?;
        let mut rows = stmt.query([entity_guid])?;
        let mut extenders = Vec::new();
        while let Some(row) = rows.next()? {
            extenders.push(parse_extender_row(kind, row)?);
        }
        Ok(extenders)
    }
}

impl ExtenderLookup for SqliteExtenderRepository<'_> {
    fn get_annotation(&self, id: i64) -> Option<Extender> {
        lookup_or_log(self, ExtenderKind::Annotation, id)
    }

    fn get_metadata(&self, id: i64) -> Option<Extender> {
        lookup_or_log(self, ExtenderKind::Metadata, id)
    }
}

fn lookup_or_log(
    repo: &SqliteExtenderRepository<'_>,
    kind: ExtenderKind,
    id: i64,
) -> Option<Extender> {
    match repo.get(kind, id) {
        Ok(found) => found,
        Err(err) => {
            warn!(
                "event=extender_lookup module=repo status=error kind={kind} id={id} error={err}"
            );
            None
        }
    }
}

fn parse_extender_row(kind: ExtenderKind, row: &Row<'_>) -> RepoResult<Extender> {
    let name: String = row.get("name")?;
    if name.is_empty() {
        let id: i64 = row.get("id")?;
        return Err(RepoError::InvalidData(format!(
            "empty name in {}.name for id {id}",
            kind.table_name()
        )));
    }

    let stored = StoredExtender {
        id: row.get("id")?,
        entity_guid: row.get("entity_guid")?,
        owner_guid: row.get("owner_guid")?,
        name,
        value: row.get("value")?,
        value_type: row.get("value_type")?,
        time_created: row.get("time_created")?,
    };
    Ok(Extender::from_stored(kind, stored))
}
