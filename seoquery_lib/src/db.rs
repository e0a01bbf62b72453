//! SQLite storage for users, saved report snapshots, and keyword lists.
//!
//! Every row is keyed by an opaque user id. Webhook-created users use their
//! email address as id.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::billing::{PlanUpdate, UserKey};
use crate::filter_state::FilterState;
use crate::rows::KeywordRow;
use crate::schema::Report;

const SCHEMA_VERSION: i32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub plan: String,
    pub credits: i64,
    pub updated_at: String,
}

/// A saved report page: the filters it was fetched with and its rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    pub user_id: String,
    pub report: String,
    pub target: String,
    pub filters: FilterState,
    pub rows: serde_json::Value,
    pub total_count: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub id: i64,
    pub report: String,
    pub target: String,
    pub row_count: i64,
    pub total_count: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordList {
    pub id: i64,
    pub name: String,
    pub item_count: i64,
    pub created_at: String,
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), DbError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;

        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(())
    }

    // -- users --

    /// Creates the user row if it does not exist yet.
    pub fn ensure_user(&self, user_id: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO users (id, plan, credits, updated_at)
             VALUES (?1, 'free', 0, ?2)
             ON CONFLICT(id) DO NOTHING",
            params![user_id, now()],
        )?;
        Ok(())
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        self.query_user("SELECT id, email, stripe_customer_id, plan, credits, updated_at FROM users WHERE id = ?1", user_id)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        self.query_user("SELECT id, email, stripe_customer_id, plan, credits, updated_at FROM users WHERE email = ?1", email)
    }

    fn query_user(&self, sql: &str, key: &str) -> Result<Option<User>, DbError> {
        self.conn
            .query_row(sql, params![key], |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    stripe_customer_id: row.get(2)?,
                    plan: row.get(3)?,
                    credits: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            })
            .optional()
            .map_err(DbError::from)
    }

    /// Writes a plan change and returns the number of user rows touched.
    ///
    /// Email keys upsert: an unknown email creates a user whose id is the
    /// email. Customer id keys only update; an unknown customer touches no
    /// rows.
    pub fn apply_plan_update(&self, update: &PlanUpdate) -> Result<usize, DbError> {
        let ts = now();
        match &update.key {
            UserKey::Email(email) => {
                let updated = self.conn.execute(
                    "UPDATE users SET plan = ?2, credits = ?3,
                       stripe_customer_id = COALESCE(?4, stripe_customer_id),
                       updated_at = ?5
                     WHERE email = ?1",
                    params![email, update.plan, update.credits, update.customer_id, ts],
                )?;
                if updated > 0 {
                    return Ok(updated);
                }
                let inserted = self.conn.execute(
                    "INSERT INTO users (id, email, stripe_customer_id, plan, credits, updated_at)
                     VALUES (?1, ?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(id) DO UPDATE SET
                       email = excluded.email,
                       stripe_customer_id = COALESCE(excluded.stripe_customer_id, users.stripe_customer_id),
                       plan = excluded.plan,
                       credits = excluded.credits,
                       updated_at = excluded.updated_at",
                    params![email, update.customer_id, update.plan, update.credits, ts],
                )?;
                Ok(inserted)
            }
            UserKey::CustomerId(customer) => {
                let updated = self.conn.execute(
                    "UPDATE users SET plan = ?2, credits = ?3, updated_at = ?4
                     WHERE stripe_customer_id = ?1",
                    params![customer, update.plan, update.credits, ts],
                )?;
                if updated == 0 {
                    tracing::warn!("no user with customer id {}; plan update dropped", customer);
                }
                Ok(updated)
            }
        }
    }

    // -- snapshots --

    pub fn save_snapshot<R: Serialize>(
        &self,
        user_id: &str,
        report: Report,
        target: &str,
        filters: &FilterState,
        rows: &[R],
        total_count: i64,
    ) -> Result<i64, DbError> {
        self.ensure_user(user_id)?;
        let filters_json = serde_json::to_string(filters)?;
        let rows_json = serde_json::to_string(rows)?;
        self.conn.execute(
            "INSERT INTO snapshots (user_id, report, target, filters_json, rows_json, total_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![user_id, report.as_str(), target, filters_json, rows_json, total_count, now()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Newest first.
    pub fn list_snapshots(&self, user_id: &str) -> Result<Vec<SnapshotSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, report, target, json_array_length(rows_json), total_count, created_at
             FROM snapshots
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(SnapshotSummary {
                    id: row.get(0)?,
                    report: row.get(1)?,
                    target: row.get(2)?,
                    row_count: row.get(3)?,
                    total_count: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_snapshot(&self, user_id: &str, id: i64) -> Result<Option<Snapshot>, DbError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, user_id, report, target, filters_json, rows_json, total_count, created_at
                 FROM snapshots WHERE user_id = ?1 AND id = ?2",
                params![user_id, id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;
        let Some((id, user_id, report, target, filters_json, rows_json, total_count, created_at)) =
            raw
        else {
            return Ok(None);
        };
        Ok(Some(Snapshot {
            id,
            user_id,
            report,
            target,
            filters: serde_json::from_str(&filters_json)?,
            rows: serde_json::from_str(&rows_json)?,
            total_count,
            created_at,
        }))
    }

    pub fn delete_snapshot(&self, user_id: &str, id: i64) -> Result<(), DbError> {
        let n = self.conn.execute(
            "DELETE FROM snapshots WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(format!("snapshot {}", id)));
        }
        Ok(())
    }

    // -- keyword lists --

    pub fn create_keyword_list(&self, user_id: &str, name: &str) -> Result<i64, DbError> {
        self.ensure_user(user_id)?;
        match self.conn.execute(
            "INSERT INTO keyword_lists (user_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, name, now()],
        ) {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(DbError::Conflict(format!("keyword list '{}'", name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All lists of a user with their item counts, by name.
    pub fn keyword_lists(&self, user_id: &str) -> Result<Vec<KeywordList>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.name, COUNT(i.keyword), l.created_at
             FROM keyword_lists l
             LEFT JOIN keyword_list_items i ON i.list_id = l.id
             WHERE l.user_id = ?1
             GROUP BY l.id
             ORDER BY l.name",
        )?;
        let lists = stmt
            .query_map(params![user_id], |row| {
                Ok(KeywordList {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    item_count: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    pub fn find_keyword_list(&self, user_id: &str, name: &str) -> Result<Option<KeywordList>, DbError> {
        self.conn
            .query_row(
                "SELECT l.id, l.name,
                   (SELECT COUNT(1) FROM keyword_list_items i WHERE i.list_id = l.id),
                   l.created_at
                 FROM keyword_lists l
                 WHERE l.user_id = ?1 AND l.name = ?2",
                params![user_id, name],
                |row| {
                    Ok(KeywordList {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        item_count: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(DbError::from)
    }

    /// Adds keywords to a list, refreshing metrics of ones already present.
    /// Membership ignores ASCII case; the first spelling added is kept.
    /// Returns the number of rows written.
    pub fn add_keywords(&self, list_id: i64, rows: &[KeywordRow]) -> Result<usize, DbError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO keyword_list_items (list_id, keyword, search_volume, cpc, difficulty, intent, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(list_id, keyword) DO UPDATE SET
                   search_volume = COALESCE(excluded.search_volume, keyword_list_items.search_volume),
                   cpc = COALESCE(excluded.cpc, keyword_list_items.cpc),
                   difficulty = COALESCE(excluded.difficulty, keyword_list_items.difficulty),
                   intent = COALESCE(excluded.intent, keyword_list_items.intent)",
            )?;
            let ts = now();
            for row in rows {
                written += stmt.execute(params![
                    list_id,
                    row.keyword,
                    row.search_volume,
                    row.cpc,
                    row.difficulty,
                    row.intent,
                    ts
                ])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Keywords in a list, highest volume first.
    pub fn list_keywords(&self, list_id: i64) -> Result<Vec<KeywordRow>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT keyword, search_volume, cpc, difficulty, intent
             FROM keyword_list_items
             WHERE list_id = ?1
             ORDER BY search_volume IS NULL, search_volume DESC, keyword",
        )?;
        let rows = stmt
            .query_map(params![list_id], |row| {
                Ok(KeywordRow {
                    keyword: row.get(0)?,
                    search_volume: row.get(1)?,
                    cpc: row.get(2)?,
                    competition: None,
                    difficulty: row.get(3)?,
                    intent: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn remove_keyword(&self, list_id: i64, keyword: &str) -> Result<(), DbError> {
        let n = self.conn.execute(
            "DELETE FROM keyword_list_items WHERE list_id = ?1 AND keyword = ?2",
            params![list_id, keyword],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(format!("keyword '{}'", keyword)));
        }
        Ok(())
    }

    /// Deletes a list and, through the foreign key cascade, its items.
    pub fn delete_keyword_list(&self, user_id: &str, name: &str) -> Result<(), DbError> {
        let n = self.conn.execute(
            "DELETE FROM keyword_lists WHERE user_id = ?1 AND name = ?2",
            params![user_id, name],
        )?;
        if n == 0 {
            return Err(DbError::NotFound(format!("keyword list '{}'", name)));
        }
        Ok(())
    }
}

fn now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
