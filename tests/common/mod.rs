#![allow(dead_code)]

use rust_mapper::{
    enum_field, field, EnumCodec, Entity, FieldDef, MapperResult, SqlEnum, SqliteConfig,
    SqliteStore,
};
use tempfile::NamedTempFile;

pub const SCHEMA: &str = r#"
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER,
        status TEXT NOT NULL
    );
    CREATE TABLE tickets (
        ticket_id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        priority INTEGER NOT NULL
    );
    CREATE TABLE settings (
        code TEXT PRIMARY KEY,
        value TEXT
    );
    CREATE TABLE events (
        message TEXT NOT NULL
    );
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Status {
    #[default]
    Active,
    Suspended,
}

impl SqlEnum for Status {
    fn variants() -> &'static [Self] {
        &[Status::Active, Status::Suspended]
    }

    fn name(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Suspended => "Suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Priority {
    #[default]
    Low,
    High,
    Urgent,
}

impl SqlEnum for Priority {
    fn variants() -> &'static [Self] {
        &[Priority::Low, Priority::High, Priority::Urgent]
    }

    fn name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub age: Option<i32>,
    pub status: Status,
    pub session_token: String,
}

impl User {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            name: name.to_string(),
            age: Some(age),
            ..Default::default()
        }
    }
}

impl Entity for User {
    const TABLE: Option<&'static str> = Some("users");
    const AUTO_INCREMENT: bool = true;

    fn fields() -> Vec<FieldDef<Self>> {
        vec![
            field!(User, id).primary_key(),
            field!(User, name),
            field!(User, age),
            enum_field!(User, status),
            field!(User, session_token).ignore(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ticket {
    pub id: Option<i32>,
    pub title: String,
    pub priority: Priority,
}

impl Entity for Ticket {
    const TABLE: Option<&'static str> = Some("tickets");
    const AUTO_INCREMENT: bool = true;

    fn fields() -> Vec<FieldDef<Self>> {
        vec![
            field!(Ticket, id).primary_key_named("ticket_id"),
            field!(Ticket, title),
            enum_field!(Ticket, priority).enum_codec(EnumCodec::Ordinal),
        ]
    }
}

/// Caller-assigned text key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Setting {
    pub code: Option<String>,
    pub value: Option<String>,
}

impl Entity for Setting {
    const TABLE: Option<&'static str> = Some("settings");

    fn fields() -> Vec<FieldDef<Self>> {
        vec![field!(Setting, code).primary_key(), field!(Setting, value)]
    }
}

/// Keyless, append-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub message: String,
}

impl Entity for Event {
    const TABLE: Option<&'static str> = Some("events");

    fn fields() -> Vec<FieldDef<Self>> {
        vec![field!(Event, message)]
    }
}

// Helper function to create a shared in-memory database for testing
pub fn create_test_store(name: &str) -> MapperResult<SqliteStore> {
    SqliteStore::open(SqliteConfig::in_memory(name).with_init_sql(SCHEMA))
}

// Helper function to create a temporary file-based database
pub fn create_temp_store() -> MapperResult<(SqliteStore, NamedTempFile)> {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_str().unwrap().to_string();
    let store = SqliteStore::open(
        SqliteConfig::new(path)
            .with_busy_timeout_ms(5_000)
            .with_init_sql(SCHEMA),
    )?;
    Ok((store, temp_file))
}

/// Routes library logs to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
