use std::fs::File;
use std::path::PathBuf;

use reqwest::blocking::{Body, RequestBuilder};
use reqwest::header::CONTENT_TYPE;

use crate::error::Result;

pub(crate) const JSON_CONTENT: &str = "application/json";
pub(crate) const XML_CONTENT: &str = "application/xml";

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestType {
    /// A plain request with no body.
    Plain,

    /// Raw request body with non-json and non-file content.
    Raw(String),

    /// A JSON request with a JSON body and the content type set to application/json.
    JSON { body: String },

    /// An XML request with an XML body and the content type set to application/xml.
    XML { body: String },

    /// A local file streamed as the request body.
    File {
        path: PathBuf,
        content_type: &'static str,
    },
}

impl RequestType {
    /// Serializes a JSON value into a JSON request body.
    pub fn json(value: &serde_json::Value) -> Result<Self> {
        Ok(RequestType::JSON {
            body: serde_json::to_string(value)?,
        })
    }

    /// Convert the request type to a request builder.
    ///
    /// # Arguments
    /// * `self` - The request type.
    /// * `request` - The request builder.
    ///
    /// # Returns
    /// A `Result` containing the modified request builder or an error.
    pub fn to_request(self, request: RequestBuilder) -> Result<RequestBuilder> {
        match self {
            RequestType::Plain => Ok(request),
            RequestType::Raw(body) => Ok(request.body(body)),
            RequestType::JSON { body } => Ok(Self::with_content(request, JSON_CONTENT, body)),
            RequestType::XML { body } => Ok(Self::with_content(request, XML_CONTENT, body)),
            RequestType::File { path, content_type } => {
                let file = File::open(&path)?;
                let size = file.metadata()?.len();
                let body = Body::sized(file, size);
                Ok(request.header(CONTENT_TYPE, content_type).body(body))
            }
        }
    }

    fn with_content(request: RequestBuilder, content_type: &str, body: String) -> RequestBuilder {
        request.header(CONTENT_TYPE, content_type).body(body)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use reqwest::blocking::Client;

    use super::*;

    /// Test converting a plain request type to a request builder.
    #[test]
    fn test_request_type_to_request_plain() {
        // Arrange
        let request = RequestType::Plain
            .to_request(Client::new().request(reqwest::Method::GET, "http://localhost"))
            .expect("Could not convert request");

        // Act
        let request = request.build().expect("Could not build request");

        // Assert
        assert_eq!(request.url().as_str(), "http://localhost/");
        assert_eq!(request.method(), reqwest::Method::GET);
        assert!(request.body().is_none());
    }

    /// Test converting a JSON request type to a request builder.
    #[test]
    fn test_request_type_to_request_json() {
        // Arrange
        let request = RequestType::json(&serde_json::json!({}))
            .unwrap()
            .to_request(Client::new().request(reqwest::Method::POST, "http://localhost"))
            .expect("Could not convert request");

        // Act
        let request = request.build().expect("Could not build request");

        // Assert
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request
                .body()
                .expect("Could not get body")
                .as_bytes()
                .expect("Could not get bytes"),
            "{}".as_bytes()
        );
        assert_eq!(
            request.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }

    /// Test converting an XML request type to a request builder.
    #[test]
    fn test_request_type_to_request_xml() {
        let request = RequestType::XML {
            body: "<codeBook/>".to_string(),
        }
        .to_request(Client::new().request(reqwest::Method::POST, "http://localhost"))
        .expect("Could not convert request")
        .build()
        .expect("Could not build request");

        assert_eq!(
            request.headers().get("Content-Type").unwrap(),
            "application/xml"
        );
        assert_eq!(
            request.body().unwrap().as_bytes().unwrap(),
            "<codeBook/>".as_bytes()
        );
    }

    // Test converting a file request type to a request builder.
    #[test]
    fn test_request_type_to_request_file() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().expect("Could not create temp file");
        write!(file, "{{\"name\": \"test\"}}").unwrap();

        let context = RequestType::File {
            path: file.path().to_path_buf(),
            content_type: JSON_CONTENT,
        };

        // Act
        let request = context
            .to_request(Client::new().request(reqwest::Method::POST, "http://localhost"))
            .expect("Could not convert request")
            .build()
            .expect("Could not build request");

        // Assert
        assert!(
            request.body().is_some(),
            "Body not found in request: {request:?}"
        );
        assert_eq!(
            request.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_request_type_missing_file() {
        let context = RequestType::File {
            path: PathBuf::from("does/not/exist.json"),
            content_type: JSON_CONTENT,
        };

        let result =
            context.to_request(Client::new().request(reqwest::Method::POST, "http://localhost"));
        assert!(result.is_err());
    }
}
