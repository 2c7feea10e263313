//! SQLite-backed transcript store with FTS5 full-text search.
//!
//! The public surface is [`TranscriptStore`], a cloneable handle over a
//! connection pool. Searches run through the FTS5 index with porter
//! stemming and prefix matching; a multi-tier fallback loosens term mode
//! and filters until something matches or the corpus is exhausted.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod store;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use store::TranscriptStore;
