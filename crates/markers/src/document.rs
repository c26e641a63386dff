use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// Opening tags only: `</...>` and doctypes start with a non-letter and never
// match. Comments are stripped up front so commented-out rows stay invisible.
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)((?:[^<>'\x22]|'[^']*'|\x22[^\x22]*\x22)*)/?>")
        .expect("tag pattern compiles")
});

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern compiles"));

static ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z_][a-zA-Z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern compiles")
});

/// One element of a rendered report: tag name plus attributes.
///
/// Attribute names are lowercased at parse time; values keep their bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: HashMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }
}

/// Flat element view of a rendered report document.
///
/// This is the stand-in for the host-rendered DOM: marker discovery only needs
/// opening tags and their attributes, so parsing is a best-effort tag scan,
/// not an HTML5 tree build. Malformed markup degrades to fewer elements.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let html = COMMENT.replace_all(html, "");
        let mut elements = Vec::new();
        for tag in TAG.captures_iter(&html) {
            let name = tag[1].to_ascii_lowercase();
            let mut attributes = HashMap::new();
            for attr in ATTR.captures_iter(&tag[2]) {
                let key = attr[1].to_ascii_lowercase();
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                // First occurrence wins, as in a real DOM.
                attributes.entry(key).or_insert_with(|| value.to_string());
            }
            elements.push(Element {
                tag: name,
                attributes,
            });
        }
        log::debug!("Parsed {} elements from document", elements.len());
        Self { elements }
    }

    /// Build a document from pre-constructed elements (host adapters, tests).
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
