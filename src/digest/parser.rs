//! Line-oriented parser for generated listing text
//!
//! Listings are separated by a blank line. Inside a listing each field sits on
//! its own line behind a bold label, e.g. `**Company**: Acme`. Anything else is
//! ignored, so a block of unlabeled prose still yields an (empty) record.

use super::ListingRecord;

#[derive(Clone, Copy)]
enum Field {
    Title,
    Company,
    Location,
    Description,
    ApplyLink,
}

const LABELS: &[(&str, Field)] = &[
    ("**Job Title**:", Field::Title),
    ("**Company**:", Field::Company),
    ("**Location**:", Field::Location),
    ("**Job Description**:", Field::Description),
    ("**Apply Link**:", Field::ApplyLink),
];

/// Split raw completion text into listing records.
///
/// Whitespace-only input produces no records.
pub fn parse_listings(raw: &str) -> Vec<ListingRecord> {
    let normalized = raw.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> ListingRecord {
    let mut record = ListingRecord::default();

    for line in block.lines() {
        let Some((field, value)) = match_label(line) else {
            continue;
        };
        let value = (!value.is_empty()).then(|| value.to_string());
        let slot = match field {
            Field::Title => &mut record.title,
            Field::Company => &mut record.company,
            Field::Location => &mut record.location,
            Field::Description => &mut record.description,
            Field::ApplyLink => &mut record.apply_link,
        };
        *slot = value;
    }

    record
}

/// Find the earliest label on the line; bullets or numbering before it are tolerated.
///
/// A label quoted inside another field's value belongs to that value.
fn match_label(line: &str) -> Option<(Field, &str)> {
    LABELS
        .iter()
        .filter_map(|(label, field)| line.find(label).map(|idx| (idx, label, *field)))
        .min_by_key(|(idx, _, _)| *idx)
        .map(|(idx, label, field)| (field, line[idx + label.len()..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_has_no_records() {
        assert!(parse_listings("").is_empty());
        assert!(parse_listings("  \n\n \n").is_empty());
    }

    #[test]
    fn test_full_block() {
        let raw = "**Job Title**: Data Analyst\n**Company**: Acme\n**Location**: NJ\n**Job Description**: Analyze data\n**Apply Link**: https://acme.example/jobs/1";
        let records = parse_listings(raw);
        assert_eq!(
            records,
            vec![ListingRecord {
                title: Some("Data Analyst".to_string()),
                company: Some("Acme".to_string()),
                location: Some("NJ".to_string()),
                description: Some("Analyze data".to_string()),
                apply_link: Some("https://acme.example/jobs/1".to_string()),
            }]
        );
    }

    #[test]
    fn test_multiple_blocks_and_crlf() {
        let raw = "**Job Title**: Chemist\r\n**Company**: BASF\r\n\r\n**Job Title**: Lab Tech\r\n**Location**: Newark, NJ";
        let records = parse_listings(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title.as_deref(), Some("Chemist"));
        assert_eq!(records[0].company.as_deref(), Some("BASF"));
        assert_eq!(records[1].title.as_deref(), Some("Lab Tech"));
        assert_eq!(records[1].location.as_deref(), Some("Newark, NJ"));
        assert_eq!(records[1].company, None);
    }

    #[test]
    fn test_numbered_and_bulleted_lines() {
        let raw = "1. **Job Title**: Energy Analyst\n   - **Company**: PSEG";
        let record = &parse_listings(raw)[0];
        assert_eq!(record.title.as_deref(), Some("Energy Analyst"));
        assert_eq!(record.company.as_deref(), Some("PSEG"));
    }

    #[test]
    fn test_label_inside_value_stays_in_value() {
        let raw = "**Job Title**: Analyst\n**Company**: Acme\n**Job Description**: Partner with the **Location**: team leads";
        let record = &parse_listings(raw)[0];
        assert_eq!(record.title.as_deref(), Some("Analyst"));
        assert_eq!(record.company.as_deref(), Some("Acme"));
        assert_eq!(
            record.description.as_deref(),
            Some("Partner with the **Location**: team leads")
        );
        assert_eq!(record.location, None);
    }

    #[test]
    fn test_unlabeled_block_yields_empty_record() {
        let raw = "Here are five listings you might like:\n\n**Job Title**: Chemist";
        let records = parse_listings(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ListingRecord::default());
        assert_eq!(records[1].title.as_deref(), Some("Chemist"));
    }

    #[test]
    fn test_missing_title_and_empty_values() {
        let raw = "**Company**: Acme\n**Location**:\n**Job Description**: Build models";
        let record = &parse_listings(raw)[0];
        assert_eq!(record.title, None);
        assert_eq!(record.company.as_deref(), Some("Acme"));
        assert_eq!(record.location, None);
        assert_eq!(record.description.as_deref(), Some("Build models"));
    }
}
