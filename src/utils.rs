use lazy_static::lazy_static;
use regress::Regex;
use serde_json::Value;

use crate::error::{DataverseError, Result};

lazy_static! {
    static ref SIZE_NUMBER: Option<Regex> = Regex::new(r"\d[\d,]*").ok();
    static ref ANCHOR: Option<Regex> = Regex::new(r"<a\s[^>]*>[\s\S]*?</a>").ok();
    static ref HREF: Option<Regex> = Regex::new(r#"href="([^"]*)""#).ok();
    static ref ICON_SRC: Option<Regex> = Regex::new(r#"src="([^"]*)""#).ok();
    static ref ANCHOR_TEXT: Option<Regex> = Regex::new(r"([^<>]*)</a>").ok();
}

/// Extracts the byte count from a human readable size message.
///
/// The storage size endpoints answer with messages such as
/// `Total size of the files stored in this dataset: 1,234,567 bytes`.
/// The first comma-grouped integer in the message is taken.
pub fn parse_size_message(message: &str) -> Result<u64> {
    let number = first_capture(&SIZE_NUMBER, message, 0)
        .ok_or_else(|| DataverseError::UnsupportedType(format!("no size in message '{message}'")))?;

    number
        .replace(',', "")
        .parse::<u64>()
        .map_err(|e| DataverseError::UnsupportedType(format!("invalid size '{number}': {e}")))
}

/// Reads a size out of a storage size response.
///
/// Newer servers send a numeric `storageSize`; otherwise the `message` is parsed.
pub fn size_from_response(data: &Value) -> Result<u64> {
    if let Some(size) = data.get("storageSize").and_then(Value::as_u64) {
        return Ok(size);
    }

    let message = data
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| DataverseError::UnsupportedType("size response has no message".to_string()))?;

    parse_size_message(message)
}

/// License details scraped from the HTML anchor in a dataset's `termsOfUse`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct License {
    pub label: Option<String>,
    pub uri: Option<String>,
    pub icon_url: Option<String>,
}

impl License {
    /// Scrapes the single anchor in `terms_of_use`.
    ///
    /// Terms without an anchor, or with more than one, give an empty license.
    pub fn from_terms_of_use(terms_of_use: &str) -> Self {
        let anchors: Vec<&str> = match ANCHOR.as_ref() {
            Some(re) => re.find_iter(terms_of_use).map(|m| &terms_of_use[m.range()]).collect(),
            None => Vec::new(),
        };

        let [anchor] = anchors.as_slice() else {
            return Self::default();
        };

        Self {
            label: first_capture(&ANCHOR_TEXT, anchor, 1)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            uri: first_capture(&HREF, anchor, 1).map(str::to_string),
            icon_url: first_capture(&ICON_SRC, anchor, 1).map(str::to_string),
        }
    }

    /// Reads a `{name, uri, iconUri}` license object.
    pub fn from_structured(license: &Value) -> Self {
        let text = |key: &str| license.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            label: text("name"),
            uri: text("uri"),
            icon_url: text("iconUri"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.uri.is_none() && self.icon_url.is_none()
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "label": self.label,
            "uri": self.uri,
            "iconUrl": self.icon_url,
        })
    }
}

fn first_capture<'t>(regex: &Option<Regex>, text: &'t str, group: usize) -> Option<&'t str> {
    let m = regex.as_ref()?.find(text)?;
    let range = m.group(group)?;
    Some(&text[range])
}
