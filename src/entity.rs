//! Entity types - the records kept by the registry
//!
//! - `Company`: organizational entity, unique by name
//! - `Chatbot`: a named conversational product owned by one company
//! - `Llm`: a named language model with a specialization, owned by one company
//! - `User`: an account that can log in to the admin surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A company in the registry.
///
/// Companies own zero or more chatbots and LLMs; deleting a company
/// cascades to its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Identity assigned by the store
    pub id: i64,
    /// Unique company name
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A company that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl NewCompany {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

/// A chatbot belonging to exactly one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chatbot {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A chatbot ready for insertion, with its foreign key resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewChatbot {
    pub name: String,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A language model entry belonging to exactly one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Llm {
    pub id: i64,
    pub name: String,
    /// Free-text specialization tag (e.g. "Customer Support")
    pub specialization: String,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
}

/// An LLM ready for insertion, with its foreign key resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewLlm {
    pub name: String,
    pub specialization: String,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A company together with everything it owns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub chatbots: Vec<Chatbot>,
    pub llms: Vec<Llm>,
}

/// An account that can log in.
///
/// The password hash never leaves the process: it is skipped on
/// serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Login name, unique ignoring case
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for creating a user; `password` is plain text and gets hashed
/// before it reaches the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let user = User {
            id: 1,
            email: "admin@example.com".to_string(),
            password_hash: String::new(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            created_at: Utc::now(),
            last_login_at: None,
            is_active: true,
        };
        assert_eq!(user.full_name(), "Admin User");
    }

    #[test]
    fn test_user_serialization_hides_hash() {
        let user = User {
            id: 7,
            email: "user@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            created_at: Utc::now(),
            last_login_at: None,
            is_active: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_company_detail_flattens_company() {
        let detail = CompanyDetail {
            company: Company {
                id: 3,
                name: "Acme".to_string(),
                description: "Rockets".to_string(),
                created_at: Utc::now(),
            },
            chatbots: Vec::new(),
            llms: Vec::new(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "Acme");
        assert!(json["chatbots"].as_array().unwrap().is_empty());
    }
}
