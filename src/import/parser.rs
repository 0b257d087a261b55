//! Line scanner for the import file
//!
//! Rows are comma separated. A double quote toggles quoted mode and is
//! dropped from the output; commas inside quotes belong to the field.
//! There is no escaped-quote handling beyond toggling.

/// Minimum number of fields for a row to be accepted
pub const MIN_FIELDS: usize = 5;

/// One accepted data row, fields trimmed, in file column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub company: String,
    pub description: String,
    pub chatbot: String,
    pub llm: String,
    pub specialization: String,
}

impl ImportRow {
    /// Build a row from scanned fields. Extra trailing fields are ignored.
    pub fn from_fields(fields: &[String]) -> Option<Self> {
        if fields.len() < MIN_FIELDS {
            return None;
        }
        Some(Self {
            company: fields[0].trim().to_string(),
            description: fields[1].trim().to_string(),
            chatbot: fields[2].trim().to_string(),
            llm: fields[3].trim().to_string(),
            specialization: fields[4].trim().to_string(),
        })
    }

    /// The chatbot column names a chatbot unless it is empty or `none`
    pub fn has_chatbot(&self) -> bool {
        !self.chatbot.is_empty() && !self.chatbot.eq_ignore_ascii_case("none")
    }

    pub fn has_llm(&self) -> bool {
        !self.llm.is_empty()
    }
}

/// Split one line into raw (untrimmed) fields
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// Parse the whole file: drop empty lines, skip the header, keep rows
/// with at least [`MIN_FIELDS`] fields.
pub fn parse_rows(content: &str) -> Vec<ImportRow> {
    content
        .split('\n')
        .filter(|line| !line.is_empty())
        .skip(1)
        .filter_map(|line| ImportRow::from_fields(&split_line(line)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_comma_stays_in_field() {
        let fields = split_line(r#""Acme, Inc.",desc,bot,llm,chat"#);
        assert_eq!(fields, vec!["Acme, Inc.", "desc", "bot", "llm", "chat"]);
    }

    #[test]
    fn test_quotes_toggle_mid_field() {
        let fields = split_line(r#"a"b,c"d,e"#);
        assert_eq!(fields, vec!["ab,cd", "e"]);
    }

    #[test]
    fn test_trailing_separator_yields_empty_field() {
        let fields = split_line("a,b,c,d,");
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[4], "");
    }

    #[test]
    fn test_short_row_is_rejected() {
        assert!(ImportRow::from_fields(&split_line("a,b,c,d")).is_none());
        assert!(ImportRow::from_fields(&split_line(r#""a,b,c,d,e""#)).is_none());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let row = ImportRow::from_fields(&split_line("  A , d1 ,B1 ,  L1,s1\r")).unwrap();
        assert_eq!(row.company, "A");
        assert_eq!(row.description, "d1");
        assert_eq!(row.chatbot, "B1");
        assert_eq!(row.llm, "L1");
        assert_eq!(row.specialization, "s1");
    }

    #[test]
    fn test_none_chatbot() {
        for value in ["none", "None", "NONE", "", "   "] {
            let row = ImportRow::from_fields(&split_line(&format!("A,d,{value},L,s"))).unwrap();
            assert!(!row.has_chatbot(), "{value:?} should mean no chatbot");
        }
        let row = ImportRow::from_fields(&split_line("A,d,Nonesuch,L,s")).unwrap();
        assert!(row.has_chatbot());
    }

    #[test]
    fn test_parse_rows_skips_header_and_blank_lines() {
        let content = "CompanyName,Description,ChatbotName,LLMName,Specialization\n\
                       A,d1,B1,L1,s1\n\
                       \n\
                       too,short\n\
                       B,d2,none,,s2\n";
        let rows = parse_rows(content);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].company, "A");
        assert_eq!(rows[1].company, "B");
        assert!(!rows[1].has_llm());
    }

    #[test]
    fn test_header_only() {
        assert!(parse_rows("CompanyName,Description,ChatbotName,LLMName,Specialization\n").is_empty());
        assert!(parse_rows("").is_empty());
    }
}
