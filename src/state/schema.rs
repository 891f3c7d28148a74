//! Database schema definitions.

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Full DDL for the agent state database.
pub const CREATE_SCHEMA: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Key-value store for runtime state
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Conversation threads opened on the assistant provider
CREATE TABLE IF NOT EXISTS threads (
    id           TEXT PRIMARY KEY,
    assistant_id TEXT,
    source       TEXT NOT NULL DEFAULT 'http',
    created_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Tool calls dispatched on behalf of the assistant
CREATE TABLE IF NOT EXISTS tool_calls (
    id             TEXT PRIMARY KEY,
    thread_id      TEXT,
    tool_name      TEXT NOT NULL,
    arguments_json TEXT NOT NULL DEFAULT '{}',
    output         TEXT NOT NULL,
    success        INTEGER NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_tool_calls_thread ON tool_calls(thread_id);
CREATE INDEX IF NOT EXISTS idx_tool_calls_created ON tool_calls(created_at);
"#;
