use tabled::{settings::Style, Table, Tabled};
use crate::entity::{CompanyDetail, User};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct CompanyRow {
    #[tabled(rename = "Company")]
    name: String,
    #[tabled(rename = "Chatbots")]
    chatbots: String,
    #[tabled(rename = "LLMs")]
    llms: String,
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Last login")]
    last_login: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// One row per company, children joined by commas
pub fn company_table(companies: &[CompanyDetail]) -> String {
    if companies.is_empty() {
        return String::new();
    }
    let rows: Vec<CompanyRow> = companies
        .iter()
        .map(|c| CompanyRow {
            name: c.company.name.clone(),
            chatbots: join_names(c.chatbots.iter().map(|b| b.name.as_str())),
            llms: join_names(c.llms.iter().map(|l| match &l.specialization {
                s if s.is_empty() => l.name.clone(),
                s => format!("{} ({})", l.name, s),
            })),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn user_table(users: &[User]) -> String {
    if users.is_empty() {
        return String::new();
    }
    let rows: Vec<UserRow> = users
        .iter()
        .map(|u| UserRow {
            id: u.id,
            email: u.email.clone(),
            name: u.full_name(),
            last_login: u
                .last_login_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn join_names<I, S>(names: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let joined: Vec<String> = names.map(|n| n.as_ref().to_string()).collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::entity::{Chatbot, Company, Llm};

    #[test]
    fn test_company_table_lists_children() {
        let now = Utc::now();
        let detail = CompanyDetail {
            company: Company { id: 1, name: "Acme".into(), description: "".into(), created_at: now },
            chatbots: vec![Chatbot { id: 1, name: "Helper".into(), company_id: 1, created_at: now }],
            llms: vec![Llm {
                id: 1,
                name: "AcmeLM".into(),
                specialization: "Chat".into(),
                company_id: 1,
                created_at: now,
            }],
        };
        let table = company_table(&[detail]);
        assert!(table.contains("Acme"));
        assert!(table.contains("Helper"));
        assert!(table.contains("AcmeLM (Chat)"));
        assert!(company_table(&[]).is_empty());
    }

    #[test]
    fn test_empty_builder() {
        assert!(TableBuilder::new().build().is_empty());
        assert!(stats_table(&[("Users", "2")]).contains("Users"));
    }
}
