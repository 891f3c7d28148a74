//! SQLite database wrapper with WAL mode and schema versioning.

use crate::state::schema;
use crate::types::*;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::info;

/// The agent state database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let version = self.schema_version();

        if version == 0 {
            info!("Creating database schema v{}", schema::SCHEMA_VERSION);
            self.conn
                .execute_batch(schema::CREATE_SCHEMA)
                .context("Failed to create schema")?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::SCHEMA_VERSION],
            )?;
        } else if version > schema::SCHEMA_VERSION {
            bail!(
                "Database schema v{} is newer than supported v{}",
                version,
                schema::SCHEMA_VERSION
            );
        }

        Ok(())
    }

    /// Get the current schema version (0 if uninitialized).
    fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Close the connection, surfacing any error from SQLite.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close database")
    }

    // -----------------------------------------------------------------------
    // Key-value store
    // -----------------------------------------------------------------------

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the KV store (upsert).
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Threads
    // -----------------------------------------------------------------------

    pub fn save_thread(&self, thread: &ThreadRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO threads (id, assistant_id, source, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO NOTHING",
            params![
                thread.id,
                thread.assistant_id,
                thread.source,
                thread.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_thread(&self, id: &str) -> Result<Option<ThreadRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, assistant_id, source, created_at FROM threads WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, assistant_id, source, created_at)| {
            Ok(ThreadRecord {
                id,
                assistant_id,
                source,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .transpose()
    }

    pub fn thread_count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM threads", [], |row| row.get(0))?;
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Tool call audit
    // -----------------------------------------------------------------------

    pub fn log_tool_call(&self, record: &ToolCallRecord) -> Result<()> {
        let args_json = serde_json::to_string(&record.arguments)?;
        self.conn.execute(
            "INSERT INTO tool_calls (id, thread_id, tool_name, arguments_json, output, success, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.thread_id,
                record.tool_name,
                args_json,
                record.output,
                record.success as i32,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent tool calls, newest first.
    pub fn recent_tool_calls(&self, limit: u32) -> Result<Vec<ToolCallRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, thread_id, tool_name, arguments_json, output, success, created_at
             FROM tool_calls ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], raw_tool_call)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    pub fn tool_calls_for_thread(&self, thread_id: &str) -> Result<Vec<ToolCallRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, thread_id, tool_name, arguments_json, output, success, created_at
             FROM tool_calls WHERE thread_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![thread_id], raw_tool_call)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    pub fn tool_call_count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tool_calls", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Column values of a `tool_calls` row before JSON and timestamp parsing.
struct RawToolCall {
    id: String,
    thread_id: Option<String>,
    tool_name: String,
    arguments_json: String,
    output: String,
    success: bool,
    created_at: String,
}

fn raw_tool_call(row: &Row<'_>) -> rusqlite::Result<RawToolCall> {
    Ok(RawToolCall {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        tool_name: row.get(2)?,
        arguments_json: row.get(3)?,
        output: row.get(4)?,
        success: row.get::<_, i32>(5)? != 0,
        created_at: row.get(6)?,
    })
}

impl RawToolCall {
    fn into_record(self) -> Result<ToolCallRecord> {
        Ok(ToolCallRecord {
            id: self.id,
            thread_id: self.thread_id,
            tool_name: self.tool_name,
            arguments: serde_json::from_str(&self.arguments_json)
                .context("Corrupt tool call arguments")?,
            output: self.output,
            success: self.success,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid timestamp '{}'", s))?
        .with_timezone(&Utc))
}
