//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - users(email, password_hash, first_name, last_name, created_at, last_login_at, is_active)
//! - companies(name, description, created_at)
//! - chatbots(name, created_at, company_id)
//! - llms(name, specialization, created_at, company_id)

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, DbStats};

use crate::Result;
use crate::entity::{Company, NewChatbot, NewCompany, NewLlm};

/// The persistence operations the importer depends on.
///
/// `SqliteStore` is the production implementation; tests may substitute
/// their own to exercise failure paths.
pub trait RecordStore {
    fn count_companies(&self) -> Result<usize>;

    fn count_chatbots(&self) -> Result<usize>;

    fn count_llms(&self) -> Result<usize>;

    /// Insert all companies in one transaction and return them with the
    /// identities the store assigned, in input order.
    fn create_companies(&mut self, companies: &[NewCompany]) -> Result<Vec<Company>>;

    /// Insert chatbots and LLMs together in one transaction.
    fn create_children(&mut self, chatbots: &[NewChatbot], llms: &[NewLlm]) -> Result<()>;

    /// Delete every LLM, chatbot and company, children first.
    fn clear_all(&mut self) -> Result<()>;

    fn has_companies(&self) -> Result<bool> {
        Ok(self.count_companies()? > 0)
    }
}
