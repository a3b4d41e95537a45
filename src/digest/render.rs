use reqwest::Url;
use std::fmt::Write;

use super::parser::parse_listings;
use super::{Digest, ListingRecord};
use crate::constants::{DIGEST_HEADING, PLACEHOLDER, SEARCH_URL_BASE};

/// Parse raw completion text and render it as a digest
pub fn format_listings(raw: &str) -> Digest {
    render_digest(&parse_listings(raw))
}

/// Wrap one card per record in the digest document shell
pub fn render_digest(records: &[ListingRecord]) -> Digest {
    let mut cards = String::new();
    for record in records {
        render_card(&mut cards, record);
    }

    let html = format!(
        r#"<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6;">
    <h2 style="color: #333;">{heading}</h2>
{cards}</body>
</html>
"#,
        heading = escape_html(DIGEST_HEADING),
    );

    Digest {
        html,
        listing_count: records.len(),
    }
}

fn render_card(out: &mut String, record: &ListingRecord) {
    let field = |value: &Option<String>| escape_html(value.as_deref().unwrap_or(PLACEHOLDER));
    let link = apply_link(record);

    // Writing into a String cannot fail
    let _ = write!(
        out,
        r#"    <div style="font-family: Arial, sans-serif; border-bottom: 1px solid #ddd; padding: 10px;">
        <h3 style="color: #0056b3;">{title}</h3>
        <p><strong>Company:</strong> {company}</p>
        <p><strong>Location:</strong> {location}</p>
        <p><strong>Job Description:</strong> {description}</p>
        <p><a href="{link}" style="color: #007bff; text-decoration: none;">🔗 Apply Here</a></p>
    </div>
"#,
        title = field(&record.title),
        company = field(&record.company),
        location = field(&record.location),
        description = field(&record.description),
        link = escape_html(&link),
    );
}

/// The record's own link, or a web search for the title when it gave none
fn apply_link(record: &ListingRecord) -> String {
    match record.apply_link.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() && !link.eq_ignore_ascii_case("n/a") => link.to_string(),
        _ => search_link(record.title.as_deref()),
    }
}

/// Web search URL for `<title> job`, form-encoded so spaces become `+`
fn search_link(title: Option<&str>) -> String {
    let query = match title {
        Some(title) => format!("{} job", title),
        None => "job".to_string(),
    };
    match Url::parse_with_params(SEARCH_URL_BASE, &[("q", query.as_str())]) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Could not build search link for {:?}: {}", query, e);
            SEARCH_URL_BASE.to_string()
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
