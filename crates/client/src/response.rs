//! Body interpretation for the three deployment response shapes.
//!
//! Services answer `200 OK` with an empty body when a reference has no
//! attachment, so emptiness is checked before any shape-specific parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::config::ResponseMode;
use crate::error::FetchError;
use crate::fetch::{AttachmentLink, AttachmentResult};

static XML_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<\s*value\b[^>]*>(.*?)</\s*value\s*>").expect("xml value regex")
});

static HTML_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a>"#)
        .expect("html anchor regex")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));

#[derive(Deserialize)]
struct ListRecord {
    url: String,
    description: Option<String>,
}

pub(crate) fn interpret(mode: ResponseMode, body: &str) -> Result<AttachmentResult, FetchError> {
    if body.trim().is_empty() {
        return Ok(AttachmentResult::NotFound);
    }
    match mode {
        ResponseMode::XmlValue => xml_value(body),
        ResponseMode::HtmlAnchor => html_anchor(body),
        ResponseMode::JsonList => json_list(body),
    }
}

/// `<value>` carries the destination URL. An empty node means the service
/// answered but holds nothing for the reference.
fn xml_value(body: &str) -> Result<AttachmentResult, FetchError> {
    let captures = XML_VALUE
        .captures(body)
        .ok_or_else(|| FetchError::Malformed("no <value> node in response".to_string()))?;
    let destination = unescape(captures[1].trim());
    if destination.is_empty() {
        return Ok(AttachmentResult::NotFound);
    }
    Ok(AttachmentResult::Found(vec![AttachmentLink {
        url: destination,
        description: None,
    }]))
}

/// First anchor wins; its inner text (tags stripped) becomes the link
/// description.
fn html_anchor(body: &str) -> Result<AttachmentResult, FetchError> {
    let captures = HTML_ANCHOR
        .captures(body)
        .ok_or_else(|| FetchError::Malformed("no anchor in response".to_string()))?;
    let href = captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default();
    let href = unescape(href.trim());
    if href.is_empty() {
        return Ok(AttachmentResult::NotFound);
    }
    let description = captures
        .get(3)
        .map(|m| TAG.replace_all(m.as_str(), ""))
        .map(|text| unescape(text.trim()))
        .filter(|text| !text.is_empty());
    Ok(AttachmentResult::Found(vec![AttachmentLink {
        url: href,
        description,
    }]))
}

fn json_list(body: &str) -> Result<AttachmentResult, FetchError> {
    let records: Vec<ListRecord> = serde_json::from_str(body)
        .map_err(|err| FetchError::Malformed(format!("invalid attachment list: {err}")))?;
    if records.is_empty() {
        return Ok(AttachmentResult::NotFound);
    }
    let links = records
        .into_iter()
        .map(|record| AttachmentLink {
            url: record.url,
            description: record
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
        })
        .collect();
    Ok(AttachmentResult::Found(links))
}

/// The handful of named entities the services actually emit. `&amp;` is
/// replaced last so it cannot re-trigger the earlier passes.
fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
