use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{DataverseError, Result};

/// Represents the status of a response from the Dataverse API.
///
/// We distinguish success and error responses with this enum.
/// Once the response is parsed, we can check if it's an error or not
/// and act accordingly.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum Status {
    /// Indicates a successful response
    OK,
    /// Indicates an error response
    ERROR,
}

impl Status {
    /// Returns the string representation of the status
    pub fn as_str(&self) -> &str {
        match self {
            Status::OK => "OK",
            Status::ERROR => "ERROR",
        }
    }

    /// Returns true if the status is OK
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::OK)
    }

    /// Returns true if the status is ERROR
    pub fn is_err(&self) -> bool {
        matches!(self, Status::ERROR)
    }
}

/// A wrapper struct that models the envelope Dataverse puts around every
/// native API response.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[allow(non_snake_case)]
pub struct Response<T> {
    /// The status of the response (OK or ERROR)
    pub status: Status,

    /// Optional data payload returned by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Optional message providing additional information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// Optional URL of the request that generated this response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requestUrl: Option<String>,

    /// Optional HTTP method used in the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requestMethod: Option<String>,
}

impl<T> Response<T> {
    /// Creates a new Response
    pub fn new(status: Status, data: Option<T>, message: Option<Message>) -> Response<T> {
        Response::<T> {
            status,
            data,
            message,
            requestUrl: None,
            requestMethod: None,
        }
    }

    /// Text of the message, or an empty string.
    pub fn message_text(&self) -> String {
        self.message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_default()
    }
}

/// Represents a message that can be either plain text or nested.
///
/// This is a workaround to tackle the issue of having a nested message
/// in the response currently caused by the editMetadata endpoint.
///
/// For more info:
/// https://dataverse.zulipchat.com/#narrow/stream/378866-troubleshooting/topic/.E2.9C.94.20Duplicate.20file.20response
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum Message {
    /// A simple string message
    PlainMessage(String),
    /// A message wrapped in a nested structure
    NestedMessage(NestedMessage),
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Message::PlainMessage(message) => write!(f, "{}", message),
            Message::NestedMessage(nested_message) => write!(f, "{}", nested_message),
        }
    }
}

/// Represents a nested message structure returned by some Dataverse endpoints
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct NestedMessage {
    /// The actual message content
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl std::fmt::Display for NestedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message.as_deref().unwrap_or_default())
    }
}

/// How the body of a response should be handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Unwrap the `{status, data}` envelope and return `data`.
    Api,
    /// Parse the body as JSON and return it as is.
    Json,
    /// Parse the body as an XML document.
    Xml,
    /// Return the unprocessed response.
    Raw,
    /// Return only the HTTP status code.
    Status,
}

/// Result of a call, shaped by the requested [`ResponseFormat`].
#[derive(Debug)]
pub enum Reply {
    Api(serde_json::Value),
    Json(serde_json::Value),
    Xml(XmlDocument),
    Raw(reqwest::blocking::Response),
    Status(u16),
}

impl Reply {
    pub fn status(&self) -> Option<u16> {
        match self {
            Reply::Status(code) => Some(*code),
            Reply::Raw(response) => Some(response.status().as_u16()),
            _ => None,
        }
    }
}

/// A well-formed XML document as text, along with its root element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    text: String,
    root: String,
}

impl XmlDocument {
    /// Checks that `text` is well-formed XML with a single root element.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut root: Option<String> = None;
        let mut depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if depth == 0 {
                        Self::set_root(&mut root, e.name().as_ref())?;
                    }
                    depth += 1;
                }
                Ok(Event::Empty(e)) => {
                    if depth == 0 {
                        Self::set_root(&mut root, e.name().as_ref())?;
                    }
                }
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Text(e)) if depth == 0 => {
                    let content = e.unescape().map_err(|e| DataverseError::Xml(e.to_string()))?;
                    if !content.trim().is_empty() {
                        return Err(DataverseError::Xml(
                            "text outside of the root element".to_string(),
                        ));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(DataverseError::Xml(format!(
                        "error at position {}: {e}",
                        reader.buffer_position()
                    )))
                }
            }
        }

        if depth != 0 {
            return Err(DataverseError::Xml("unclosed element".to_string()));
        }

        let root = root.ok_or_else(|| DataverseError::Xml("document has no root element".to_string()))?;

        Ok(Self {
            text: text.to_string(),
            root,
        })
    }

    fn set_root(root: &mut Option<String>, name: &[u8]) -> Result<()> {
        if root.is_some() {
            return Err(DataverseError::Xml("more than one root element".to_string()));
        }
        *root = Some(String::from_utf8_lossy(name).into_owned());
        Ok(())
    }

    /// Qualified name of the root element, e.g. `codeBook` or `oai_dc:dc`.
    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
