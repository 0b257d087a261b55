//! # Botledger - Company, chatbot and LLM registry
//!
//! A small administrative backend for companies and the chatbots and
//! language models they own.
//!
//! Botledger provides:
//! - SQLite-backed storage for users, companies, chatbots and LLMs
//! - A two-pass CSV importer that resolves child records to companies by name
//! - Password login with an in-memory session store
//! - A JSON API (axum) and a command-line front end

pub mod entity;
pub mod storage;
pub mod import;
pub mod users;
pub mod auth;
pub mod server;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use entity::{Chatbot, Company, CompanyDetail, Llm, User};
pub use storage::{RecordStore, SqliteStore};
pub use import::{CsvImporter, ImportResult};
pub use users::UserService;
pub use auth::{AuthContext, AuthService, SessionStore};

/// Result type alias for Botledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Botledger operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("User with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
