//! Entity mapping and single-row CRUD for the Runar ecosystem.
//!
//! # Intention
//!
//! - Map plain Rust structs onto SQL tables through explicit field registration.
//! - Build positional INSERT / UPDATE / DELETE statements from that mapping.
//! - Execute them against a store and write generated keys back into the entity.
//!
//! # Architectural Boundaries
//!
//! - Only mapping and single-entity statement code belongs here.
//! - Pooling, transactions, pagination and query DSLs live with the caller.
//!
//! # Example
//!
//! ```ignore
//! use rust_mapper::{field, Entity, FieldDef, Mapper, SqliteConfig, SqliteStore};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: Option<i64>,
//!     name: String,
//!     age: i32,
//! }
//!
//! impl Entity for User {
//!     const TABLE: Option<&'static str> = Some("users");
//!     const AUTO_INCREMENT: bool = true;
//!
//!     fn fields() -> Vec<FieldDef<Self>> {
//!         vec![field!(User, id).primary_key(), field!(User, name), field!(User, age)]
//!     }
//! }
//!
//! let mapper = Mapper::new(SqliteStore::open(SqliteConfig::new("app.db"))?);
//! let mut alice = User { id: None, name: "Alice".into(), age: 30 };
//! mapper.create(&mut alice)?;
//! assert!(alice.id.is_some());
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod metadata;
pub mod store;
pub mod value;

pub use builder::SqlStatement;
pub use cache::MetadataCache;
pub use config::{MapperConfig, NamingConvention, SqliteConfig};
pub use entity::{EnumCodec, EnumMember, Entity, FieldDef, FieldValue, SqlEnum};
pub use error::{MapperError, MapperResult};
pub use mapper::Mapper;
pub use metadata::{ColumnMapping, TableMetadata};
pub use store::{Insertion, Row, Session, SqliteSession, SqliteStore, Store};
pub use value::{FromValue, ToValue, Value};
