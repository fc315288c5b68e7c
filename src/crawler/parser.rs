//! MediaWiki API response parser
//!
//! This module turns an `action=parse` response into a `Document`:
//! - Canonical title and page id (after redirects)
//! - Plain body text extracted from the rendered HTML
//! - Outbound article links (main namespace only)

use crate::crawler::fetcher::{Document, SourceError};
use scraper::node::Element;
use scraper::{ElementRef, Html};
use serde::Deserialize;

/// Suffix MediaWiki uses for disambiguation pages
const DISAMBIGUATION_SUFFIX: &str = "(disambiguation)";

/// Element names whose text never belongs to the body
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript"];

/// Classes marking citation markers and editor chrome
const SKIPPED_CLASSES: &[&str] = &["reference", "mw-editsection", "mw-references-wrap"];

/// Elements whose contents sit on their own line
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "dl", "dt", "dd", "table", "tbody", "thead", "tfoot", "tr",
    "caption", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "section", "figure",
    "figcaption", "hr",
];

/// Table cells, separated by a space within their row
const CELL_ELEMENTS: &[&str] = &["td", "th"];

/// Top-level shape of an `action=parse&formatversion=2` response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    parse: Option<ParseResult>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ParseResult {
    title: String,
    pageid: i64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    links: Vec<ApiLink>,
}

#[derive(Debug, Deserialize)]
struct ApiLink {
    ns: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

/// Returns true if the title names a disambiguation page
///
/// Such pages list other articles rather than describing one, so they are
/// never fetched.
pub fn is_disambiguation(title: &str) -> bool {
    title.trim_end().ends_with(DISAMBIGUATION_SUFFIX)
}

/// Parses a raw `action=parse` JSON body
///
/// # Arguments
///
/// * `body` - The response body
/// * `target` - The requested title or id, used in error messages
///
/// # Returns
///
/// * `Ok(Document)` - The canonical page
/// * `Err(SourceError::NotFound)` - The title or id does not exist
/// * `Err(SourceError)` - Any other API error or malformed response
pub fn parse_response(body: &str, target: &str) -> Result<Document, SourceError> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(match error.code.as_str() {
            "missingtitle" | "nosuchpageid" | "invalidtitle" | "missingcontent" => {
                SourceError::NotFound(target.to_string())
            }
            _ => SourceError::Api {
                code: error.code,
                info: error.info,
            },
        });
    }

    let parsed = response
        .parse
        .ok_or_else(|| SourceError::Decode(format!("no parse result for {}", target)))?;

    let mut links: Vec<String> = Vec::new();
    for link in parsed.links {
        if link.ns != 0 || link.title.is_empty() || links.contains(&link.title) {
            continue;
        }
        links.push(link.title);
    }

    Ok(Document {
        id: parsed.pageid,
        title: parsed.title,
        body: html_to_text(&parsed.text),
        links,
    })
}

/// Extracts readable text from rendered article HTML
///
/// Text inside scripts, styles, citation markers and edit links is dropped.
/// Line breaks and block elements start a new line and table cells are
/// separated by a space, so adjacent words never run together. Each
/// non-blank line is trimmed; blank lines are removed.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();
    collect_text(fragment.root_element(), &mut raw);

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let value = child.value();
        if is_skipped(value) {
            continue;
        }
        let name = value.name();
        if name == "br" {
            out.push('\n');
            continue;
        }

        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            out.push('\n');
        }
        collect_text(child, out);
        if block {
            out.push('\n');
        } else if CELL_ELEMENTS.contains(&name) {
            out.push(' ');
        }
    }
}

fn is_skipped(element: &Element) -> bool {
    SKIPPED_ELEMENTS.contains(&element.name())
        || element
            .classes()
            .any(|class| SKIPPED_CLASSES.contains(&class))
}
