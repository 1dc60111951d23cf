//! HTML extraction: title, meta description, Open Graph, headers

use crate::error::Fault;
use clap::ValueEnum;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

/// What to pull out of a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtractionKind {
    /// Raw HTML, unparsed
    Html,
    /// Text of the <title> element
    Title,
    /// content of <meta name="description">
    MetaDescription,
    /// All og:* meta properties
    OpenGraph,
    H1,
    H2,
    H3,
}

impl ExtractionKind {
    /// Name of the tool exposing this extraction
    pub fn tool_name(self) -> &'static str {
        match self {
            ExtractionKind::Html => "fetch_html",
            ExtractionKind::Title => "extract_page_title",
            ExtractionKind::MetaDescription => "extract_meta_description",
            ExtractionKind::OpenGraph => "extract_open_graph_metadata",
            ExtractionKind::H1 => "extract_h1_headers",
            ExtractionKind::H2 => "extract_h2_headers",
            ExtractionKind::H3 => "extract_h3_headers",
        }
    }
}

/// Extract `kind` from `html`.
///
/// Missing fields are successes (`null`, `{}` or `[]`); only a document the
/// parser cannot work with is a fault.
pub fn extract(html: &str, kind: ExtractionKind) -> Result<Value, Fault> {
    let value = match kind {
        ExtractionKind::Html => Value::String(html.to_string()),
        ExtractionKind::Title => {
            page_title(&parse_document(html)?)?.map_or(Value::Null, Value::String)
        }
        ExtractionKind::MetaDescription => {
            meta_description(&parse_document(html)?)?.map_or(Value::Null, Value::String)
        }
        ExtractionKind::OpenGraph => Value::Object(open_graph(&parse_document(html)?)?),
        ExtractionKind::H1 => headers(&parse_document(html)?, "h1")?.into(),
        ExtractionKind::H2 => headers(&parse_document(html)?, "h2")?.into(),
        ExtractionKind::H3 => headers(&parse_document(html)?, "h3")?.into(),
    };
    Ok(value)
}

/// Parse a fetched body, rejecting an empty one.
///
/// Stray NUL bytes are left to the parser, which replaces them.
pub fn parse_document(html: &str) -> Result<Html, Fault> {
    if html.trim().is_empty() {
        return Err(Fault::Parse("document is empty".into()));
    }
    Ok(Html::parse_document(html))
}

pub fn page_title(doc: &Html) -> Result<Option<String>, Fault> {
    select_text(doc, "title")
}

pub fn meta_description(doc: &Html) -> Result<Option<String>, Fault> {
    select_attr(doc, "meta[name='description']", "content")
}

/// `og:*` properties keyed without the prefix; the first occurrence wins
pub fn open_graph(doc: &Html) -> Result<Map<String, Value>, Fault> {
    let selector = selector("meta[property^='og:']")?;
    let mut props = Map::new();
    for el in doc.select(&selector) {
        let (Some(property), Some(content)) = (el.value().attr("property"), el.value().attr("content"))
        else {
            continue;
        };
        let key = property.trim_start_matches("og:").trim();
        if key.is_empty() || props.contains_key(key) {
            continue;
        }
        props.insert(key.to_string(), Value::String(content.trim().to_string()));
    }
    Ok(props)
}

/// Trimmed, non-empty text of every `tag` element in document order
pub fn headers(doc: &Html, tag: &str) -> Result<Vec<String>, Fault> {
    let selector = selector(tag)?;
    Ok(doc
        .select(&selector)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty())
        .collect())
}

fn select_text(doc: &Html, sel: &str) -> Result<Option<String>, Fault> {
    let selector = selector(sel)?;
    Ok(doc
        .select(&selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty()))
}

fn select_attr(doc: &Html, sel: &str, attr: &str) -> Result<Option<String>, Fault> {
    let selector = selector(sel)?;
    Ok(doc
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn selector(sel: &str) -> Result<Selector, Fault> {
    Selector::parse(sel).map_err(|e| Fault::Parse(format!("invalid selector '{}': {}", sel, e)))
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_extract_page_title() {
        let html = "<html><head><title>Test Page</title></head><body></body></html>";
        assert_eq!(extract(html, ExtractionKind::Title).unwrap(), json!("Test Page"));
    }

    #[test]
    fn test_extract_page_title_missing_is_null() {
        let html = "<html><head></head><body></body></html>";
        assert_eq!(extract(html, ExtractionKind::Title).unwrap(), Value::Null);
    }

    #[test]
    fn test_extract_meta_description() {
        let html = r#"<html><head><meta name="description" content="Test description"></head><body></body></html>"#;
        assert_eq!(
            extract(html, ExtractionKind::MetaDescription).unwrap(),
            json!("Test description")
        );
    }

    #[test]
    fn test_extract_meta_description_missing_is_null() {
        let html = "<html><head></head><body></body></html>";
        assert_eq!(
            extract(html, ExtractionKind::MetaDescription).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_extract_open_graph() {
        let html = r#"
            <html>
            <head>
                <meta property="og:title" content="OG Title">
                <meta property="og:description" content="OG Description">
                <meta property="og:image" content="https://example.com/image.jpg">
                <meta property="og:image" content="https://example.com/second.jpg">
                <meta name="twitter:card" content="summary">
            </head>
            <body></body>
            </html>
        "#;
        assert_eq!(
            extract(html, ExtractionKind::OpenGraph).unwrap(),
            json!({
                "title": "OG Title",
                "description": "OG Description",
                "image": "https://example.com/image.jpg"
            })
        );
    }

    #[test]
    fn test_extract_open_graph_missing_is_empty_object() {
        let html = "<html><head><title>x</title></head></html>";
        assert_eq!(extract(html, ExtractionKind::OpenGraph).unwrap(), json!({}));
    }

    #[test]
    fn test_extract_headers_by_level() {
        let html = r#"
            <html>
            <body>
                <h1>First Header</h1>
                <h2>First H2</h2>
                <h1>Second
                    Header</h1>
                <h3>Only H3</h3>
                <h2>Second H2</h2>
            </body>
            </html>
        "#;
        assert_eq!(
            extract(html, ExtractionKind::H1).unwrap(),
            json!(["First Header", "Second Header"])
        );
        assert_eq!(
            extract(html, ExtractionKind::H2).unwrap(),
            json!(["First H2", "Second H2"])
        );
        assert_eq!(extract(html, ExtractionKind::H3).unwrap(), json!(["Only H3"]));
    }

    #[test]
    fn test_extract_headers_empty() {
        let html = "<html><body><p>No headers here</p></body></html>";
        for kind in [ExtractionKind::H1, ExtractionKind::H2, ExtractionKind::H3] {
            assert_eq!(extract(html, kind).unwrap(), json!([]));
        }
    }

    #[test]
    fn test_raw_html_passthrough() {
        let html = "<p>not even a full document";
        assert_eq!(extract(html, ExtractionKind::Html).unwrap(), json!(html));
    }

    #[test]
    fn test_unparseable_documents() {
        for html in ["", "   \n\t"] {
            let fault = extract(html, ExtractionKind::Title).unwrap_err();
            assert_eq!(fault.kind(), ErrorKind::ParsingError, "{:?}", html);
        }
    }

    #[test]
    fn test_nul_bytes_do_not_hide_fields() {
        let html = "<html><head><title>Real</title></head><body><h1>a\0b</h1></body></html>";
        assert_eq!(extract(html, ExtractionKind::Title).unwrap(), json!("Real"));
        assert_eq!(extract(html, ExtractionKind::H1).unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(ExtractionKind::Html.tool_name(), "fetch_html");
        assert_eq!(
            ExtractionKind::OpenGraph.tool_name(),
            "extract_open_graph_metadata"
        );
        assert_eq!(ExtractionKind::H3.tool_name(), "extract_h3_headers");
    }
}
