//! CSV bulk import
//!
//! Expected columns, positional, header row skipped:
//! `CompanyName,Description,ChatbotName,LLMName,Specialization`

pub mod parser;
pub mod source;
pub mod importer;

pub use importer::{CsvImporter, ImportError, ImportResult};
pub use parser::{parse_rows, split_line, ImportRow};
pub use source::{FileSource, PathSource};

/// Default location of the import file, relative to the working directory
pub const DEFAULT_CSV_PATH: &str = "files/import.csv";
