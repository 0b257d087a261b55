//! SQLite storage implementation

use std::path::Path;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, OptionalExtension};
use serde::Serialize;
use crate::Result;
use crate::entity::{Chatbot, Company, CompanyDetail, Llm, NewChatbot, NewCompany, NewLlm, User};
use super::{schema, RecordStore};

const COMPANY_COLUMNS: &str = "id, name, description, created_at";
const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, created_at, last_login_at, is_active";

/// SQLite-backed storage for users and the company registry
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Company Operations ==========

    /// All companies ordered by name, each with its chatbots and LLMs
    pub fn list_companies_with_children(&self) -> Result<Vec<CompanyDetail>> {
        let companies = self.query_companies(
            &format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name"),
            [],
        )?;
        self.attach_children(companies)
    }

    /// The first `limit` companies in insertion order, with children
    pub fn sample_companies(&self, limit: usize) -> Result<Vec<CompanyDetail>> {
        let companies = self.query_companies(
            &format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY id LIMIT ?1"),
            [limit as i64],
        )?;
        self.attach_children(companies)
    }

    /// Get a company by its exact name
    pub fn get_company_by_name(&self, name: &str) -> Result<Option<Company>> {
        self.conn
            .query_row(
                &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE name = ?1"),
                [name],
                row_to_company,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Chatbots owned by a company
    pub fn chatbots_for_company(&self, company_id: i64) -> Result<Vec<Chatbot>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, company_id, created_at FROM chatbots WHERE company_id = ?1 ORDER BY id"
        )?;

        let chatbots = stmt
            .query_map([company_id], row_to_chatbot)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(chatbots)
    }

    /// LLMs owned by a company
    pub fn llms_for_company(&self, company_id: i64) -> Result<Vec<Llm>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, specialization, company_id, created_at FROM llms WHERE company_id = ?1 ORDER BY id"
        )?;

        let llms = stmt
            .query_map([company_id], row_to_llm)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(llms)
    }

    fn query_companies<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Company>> {
        let mut stmt = self.conn.prepare(sql)?;
        let companies = stmt
            .query_map(params, row_to_company)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(companies)
    }

    fn attach_children(&self, companies: Vec<Company>) -> Result<Vec<CompanyDetail>> {
        companies
            .into_iter()
            .map(|company| {
                Ok(CompanyDetail {
                    chatbots: self.chatbots_for_company(company.id)?,
                    llms: self.llms_for_company(company.id)?,
                    company,
                })
            })
            .collect()
    }

    fn count_table(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== User Operations ==========

    /// Insert a user and return it with its assigned id
    pub fn insert_user(&self, user: &User) -> Result<User> {
        self.conn.execute(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, created_at, last_login_at, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                user.email,
                user.password_hash,
                user.first_name,
                user.last_name,
                user.created_at,
                user.last_login_at,
                user.is_active,
            ],
        )?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            ..user.clone()
        })
    }

    /// Get a user by id
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a user by email, ignoring case
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower(?1)"),
                [email],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All users, active or not
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(users)
    }

    /// Update the editable fields of a user. Returns false if no row matched.
    pub fn update_user(&self, user: &User) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET first_name = ?1, last_name = ?2, email = ?3, is_active = ?4 WHERE id = ?5",
            params![user.first_name, user.last_name, user.email, user.is_active, user.id],
        )?;
        Ok(changed > 0)
    }

    /// Record a successful login
    pub fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        self.conn
            .execute("UPDATE users SET last_login_at = ?1 WHERE id = ?2", params![at, id])?;
        Ok(())
    }

    /// Delete a user by id. Returns false if no row matched.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Delete every user, returning how many were removed
    pub fn delete_all_users(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM users", [])?)
    }

    pub fn count_users(&self) -> Result<usize> {
        self.count_table("users")
    }

    // ========== Introspection ==========

    /// Names of all tables in the database
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(names)
    }

    /// Check whether a table exists
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Round-trip a trivial query to confirm the connection works
    pub fn ping(&self) -> bool {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            users: self.count_users()?,
            companies: self.count_companies()?,
            chatbots: self.count_chatbots()?,
            llms: self.count_llms()?,
        })
    }
}

impl RecordStore for SqliteStore {
    fn count_companies(&self) -> Result<usize> {
        self.count_table("companies")
    }

    fn count_chatbots(&self) -> Result<usize> {
        self.count_table("chatbots")
    }

    fn count_llms(&self) -> Result<usize> {
        self.count_table("llms")
    }

    fn create_companies(&mut self, companies: &[NewCompany]) -> Result<Vec<Company>> {
        let tx = self.conn.transaction()?;
        let mut created = Vec::with_capacity(companies.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO companies (name, description, created_at) VALUES (?1, ?2, ?3)"
            )?;
            for company in companies {
                stmt.execute(params![company.name, company.description, company.created_at])?;
                created.push(Company {
                    id: tx.last_insert_rowid(),
                    name: company.name.clone(),
                    description: company.description.clone(),
                    created_at: company.created_at,
                });
            }
        }
        tx.commit()?;
        Ok(created)
    }

    fn create_children(&mut self, chatbots: &[NewChatbot], llms: &[NewLlm]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chatbots (name, created_at, company_id) VALUES (?1, ?2, ?3)"
            )?;
            for chatbot in chatbots {
                stmt.execute(params![chatbot.name, chatbot.created_at, chatbot.company_id])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO llms (name, specialization, created_at, company_id) VALUES (?1, ?2, ?3, ?4)"
            )?;
            for llm in llms {
                stmt.execute(params![llm.name, llm.specialization, llm.created_at, llm.company_id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM llms", [])?;
        tx.execute("DELETE FROM chatbots", [])?;
        tx.execute("DELETE FROM companies", [])?;
        tx.commit()?;
        Ok(())
    }
}

fn row_to_company(row: &rusqlite::Row) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn row_to_chatbot(row: &rusqlite::Row) -> rusqlite::Result<Chatbot> {
    Ok(Chatbot {
        id: row.get(0)?,
        name: row.get(1)?,
        company_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn row_to_llm(row: &rusqlite::Row) -> rusqlite::Result<Llm> {
    Ok(Llm {
        id: row.get(0)?,
        name: row.get(1)?,
        specialization: row.get(2)?,
        company_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        created_at: row.get(5)?,
        last_login_at: row.get(6)?,
        is_active: row.get(7)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    pub users: usize,
    pub companies: usize,
    pub chatbots: usize,
    pub llms: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Users: {}", self.users)?;
        writeln!(f, "  Companies: {}", self.companies)?;
        writeln!(f, "  Chatbots: {}", self.chatbots)?;
        writeln!(f, "  LLMs: {}", self.llms)
    }
}
