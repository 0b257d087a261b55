//! Two-pass CSV importer
//!
//! Pass 1 stages companies (deduplicated by name, first row wins) and their
//! chatbots and LLMs, then commits the companies so the store assigns ids.
//! Pass 2 re-reads the source to map each chatbot/LLM name to its company
//! name (last row wins), resolves those names to persisted ids and commits
//! all children in one go.

use std::collections::{HashMap, HashSet};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use crate::entity::{Company, NewChatbot, NewCompany, NewLlm};
use crate::storage::RecordStore;
use super::parser::{parse_rows, ImportRow};
use super::source::FileSource;

/// Outcome of one import run, reported to the caller as-is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub companies_imported: usize,
    pub chatbots_imported: usize,
    pub llms_imported: usize,
}

impl ImportResult {
    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            ..Default::default()
        }
    }
}

/// Why an import did not complete
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Data has already been imported. Clear existing data first if you want to re-import.")]
    AlreadyImported,

    #[error("CSV file not found at: {0}")]
    SourceNotFound(String),

    #[error("Cannot access the CSV file. Please close any applications that might have it open and try again.")]
    SourceUnreadable(#[source] std::io::Error),

    #[error("Error processing CSV file relationships.")]
    Relationships(#[source] std::io::Error),

    #[error("Error importing CSV: {0}")]
    Store(#[from] crate::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImportCounts {
    companies: usize,
    chatbots: usize,
    llms: usize,
}

/// A chatbot waiting for its company id; `company` is the in-memory link
/// made in pass 1.
#[derive(Debug)]
struct StagedChatbot {
    name: String,
    company: String,
}

#[derive(Debug)]
struct StagedLlm {
    name: String,
    specialization: String,
    company: String,
}

/// Everything pass 1 produces before anything is written
#[derive(Debug, Default)]
struct StagedBatch {
    companies: Vec<NewCompany>,
    chatbots: Vec<StagedChatbot>,
    llms: Vec<StagedLlm>,
}

impl StagedBatch {
    fn from_rows(rows: &[ImportRow]) -> Self {
        let mut batch = Self::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for row in rows {
            if seen.insert(row.company.as_str()) {
                batch
                    .companies
                    .push(NewCompany::new(row.company.clone(), row.description.clone()));
            }

            if row.has_chatbot() {
                batch.chatbots.push(StagedChatbot {
                    name: row.chatbot.clone(),
                    company: row.company.clone(),
                });
            }

            if row.has_llm() {
                batch.llms.push(StagedLlm {
                    name: row.llm.clone(),
                    specialization: row.specialization.clone(),
                    company: row.company.clone(),
                });
            }
        }

        batch
    }
}

/// Name-keyed owner maps built from the second read
#[derive(Debug, Default)]
struct OwnerMaps {
    chatbots: HashMap<String, String>,
    llms: HashMap<String, String>,
}

impl OwnerMaps {
    fn from_rows(rows: &[ImportRow]) -> Self {
        let mut maps = Self::default();
        for row in rows {
            if row.has_chatbot() {
                maps.chatbots.insert(row.chatbot.clone(), row.company.clone());
            }
            if row.has_llm() {
                maps.llms.insert(row.llm.clone(), row.company.clone());
            }
        }
        maps
    }
}

/// Imports companies, chatbots and LLMs from a CSV source into an empty
/// store.
pub struct CsvImporter<'a, S: RecordStore, F: FileSource> {
    store: &'a mut S,
    source: F,
}

impl<'a, S: RecordStore, F: FileSource> CsvImporter<'a, S, F> {
    pub fn new(store: &'a mut S, source: F) -> Self {
        Self { store, source }
    }

    /// True if the store answers and already holds at least one company
    pub fn already_imported(&self) -> bool {
        match self.store.has_companies() {
            Ok(found) => found,
            Err(e) => {
                debug!(error = %e, "company check failed, treating store as empty");
                false
            }
        }
    }

    /// Run the import. Never fails outright; problems are reported in the
    /// returned result with zero counts.
    pub fn import(&mut self) -> ImportResult {
        info!(source = %self.source.location(), "Starting CSV import...");

        match self.run() {
            Ok(counts) => {
                info!(
                    companies = counts.companies,
                    chatbots = counts.chatbots,
                    llms = counts.llms,
                    "CSV import completed successfully"
                );
                ImportResult {
                    success: true,
                    message: format!(
                        "Successfully imported {} companies, {} chatbots, and {} LLMs.",
                        counts.companies, counts.chatbots, counts.llms
                    ),
                    companies_imported: counts.companies,
                    chatbots_imported: counts.chatbots,
                    llms_imported: counts.llms,
                }
            }
            Err(err) => {
                match &err {
                    ImportError::AlreadyImported => warn!("{}", err),
                    ImportError::SourceNotFound(_) => warn!("{}", err),
                    ImportError::SourceUnreadable(e) => {
                        error!(error = %e, "Cannot access CSV file. It may be open in another application.")
                    }
                    ImportError::Relationships(e) => error!(error = %e, "Error re-reading CSV for mapping"),
                    ImportError::Store(e) => error!(error = %e, "Error during CSV import"),
                }
                ImportResult::failed(err.to_string())
            }
        }
    }

    fn run(&mut self) -> Result<ImportCounts, ImportError> {
        if self.already_imported() {
            return Err(ImportError::AlreadyImported);
        }

        if !self.source.exists() {
            return Err(ImportError::SourceNotFound(self.source.location()));
        }

        let content = self.source.read_text().map_err(ImportError::SourceUnreadable)?;
        let batch = StagedBatch::from_rows(&parse_rows(&content));
        debug!(
            companies = batch.companies.len(),
            chatbots = batch.chatbots.len(),
            llms = batch.llms.len(),
            "staged rows"
        );

        let persisted = self.store.create_companies(&batch.companies)?;

        // Companies are committed from here on; a failure must not leave
        // half an import behind.
        match self.link_children(&batch, &persisted) {
            Ok(counts) => Ok(counts),
            Err(err) => {
                if let Err(e) = self.store.clear_all() {
                    error!(error = %e, "failed to discard partially imported companies");
                }
                Err(err)
            }
        }
    }

    fn link_children(
        &mut self,
        batch: &StagedBatch,
        persisted: &[Company],
    ) -> Result<ImportCounts, ImportError> {
        let content = self.source.read_text().map_err(ImportError::Relationships)?;
        let owners = OwnerMaps::from_rows(&parse_rows(&content));

        let ids: HashMap<&str, i64> = persisted
            .iter()
            .map(|c| (c.name.as_str(), c.id))
            .collect();

        let now = Utc::now();

        let chatbots = batch
            .chatbots
            .iter()
            .map(|staged| {
                let company_id = resolve_owner(&ids, owners.chatbots.get(&staged.name), &staged.company)?;
                Ok(NewChatbot {
                    name: staged.name.clone(),
                    company_id,
                    created_at: now,
                })
            })
            .collect::<Result<Vec<_>, ImportError>>()?;

        let llms = batch
            .llms
            .iter()
            .map(|staged| {
                let company_id = resolve_owner(&ids, owners.llms.get(&staged.name), &staged.company)?;
                Ok(NewLlm {
                    name: staged.name.clone(),
                    specialization: staged.specialization.clone(),
                    company_id,
                    created_at: now,
                })
            })
            .collect::<Result<Vec<_>, ImportError>>()?;

        self.store.create_children(&chatbots, &llms)?;

        Ok(ImportCounts {
            companies: persisted.len(),
            chatbots: chatbots.len(),
            llms: llms.len(),
        })
    }
}

/// Company id for a child record: the company named by the owner map if it
/// was persisted, else the company the record was staged under.
fn resolve_owner(
    ids: &HashMap<&str, i64>,
    mapped: Option<&String>,
    staged_company: &str,
) -> Result<i64, ImportError> {
    mapped
        .and_then(|name| ids.get(name.as_str()))
        .or_else(|| ids.get(staged_company))
        .copied()
        .ok_or_else(|| {
            ImportError::Store(crate::Error::NotFound(format!("company '{}'", staged_company)))
        })
}
