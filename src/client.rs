use std::collections::HashMap;
use std::io::{Read, Write};

use lazy_static::lazy_static;
use regress::Regex;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, Url};
use serde_json::Value;

use crate::config::Config;
use crate::error::{DataverseError, Result, TrimmedBacktrace};
use crate::request::{RequestType, JSON_CONTENT, XML_CONTENT};
use crate::response::{Reply, Response, ResponseFormat, XmlDocument};

lazy_static! {
    static ref ERROR_ENVELOPE: Option<Regex> =
        Regex::new(r#"^\s*\{\s*"status"\s*:\s*"ERROR"\s*,\s*"message"\s*:\s*""#).ok();
    static ref CHUNK_SIZE: usize = std::env::var("DATAVERSE_CHUNK_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|size| *size > 0)
        .unwrap_or(64 * 1024); // Default to 64 KiB if env var not set or invalid
}

/// Query parameters of a single request.
pub type Parameters = Option<HashMap<String, String>>;

/// Builds a parameter map from key/value pairs.
pub fn params<const N: usize>(pairs: [(&str, &str); N]) -> Parameters {
    Some(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[derive(Debug, Clone)]
pub struct BaseClient {
    base_url: Url,
    client: Client,
}

// This is the base client that will be used to make requests to the API.
// Its acts as a wrapper around the reqwest::blocking::Client, attaches the
// API token to every request and turns the Dataverse envelope into results.
impl BaseClient {
    pub fn new(config: &Config) -> Result<Self> {
        let default_headers = Self::default_headers(config.api_token())?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // 5-minute timeout
            .connect_timeout(std::time::Duration::from_secs(60)) // 1-minute connect timeout
            .default_headers(default_headers)
            .build()?;

        Ok(BaseClient {
            base_url: config.api_url().clone(),
            client,
        })
    }

    /// Builds a client from `API_URL` and `API_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::new(&Config::from_env()?)
    }

    fn default_headers(api_token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let token = HeaderValue::from_str(api_token).map_err(|_| {
            crate::config::ConfigError::Missing(crate::config::API_TOKEN_VAR.to_string())
        })?;
        headers.insert("X-Dataverse-key", token);
        headers.insert(
            "User-Agent",
            HeaderValue::from_static(concat!("dataverse-rdm/", env!("CARGO_PKG_VERSION"))),
        );

        Ok(headers)
    }

    /// Get the base URL of the client
    ///
    /// # Returns
    ///
    /// A reference to the base URL of the client
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a request and unwraps the `{status, data}` envelope.
    pub fn api(
        &self,
        method: Method,
        path: &str,
        parameters: Parameters,
        context: RequestType,
    ) -> Result<Value> {
        match self.call(method, path, parameters, context, ResponseFormat::Api)? {
            Reply::Api(value) => Ok(value),
            other => Err(unexpected_reply(&other)),
        }
    }

    pub fn get(&self, path: &str, parameters: Parameters) -> Result<Value> {
        self.api(Method::GET, path, parameters, RequestType::Plain)
    }

    pub fn post(&self, path: &str, parameters: Parameters, context: RequestType) -> Result<Value> {
        self.api(Method::POST, path, parameters, context)
    }

    pub fn delete(&self, path: &str, parameters: Parameters) -> Result<Value> {
        self.api(Method::DELETE, path, parameters, RequestType::Plain)
    }

    /// Performs a request and returns the raw JSON body.
    pub fn json(&self, path: &str, parameters: Parameters) -> Result<Value> {
        match self.call(Method::GET, path, parameters, RequestType::Plain, ResponseFormat::Json)? {
            Reply::Json(value) => Ok(value),
            other => Err(unexpected_reply(&other)),
        }
    }

    /// Performs a request and returns the body as an XML document.
    pub fn xml(&self, path: &str, parameters: Parameters) -> Result<XmlDocument> {
        match self.call(Method::GET, path, parameters, RequestType::Plain, ResponseFormat::Xml)? {
            Reply::Xml(doc) => Ok(doc),
            other => Err(unexpected_reply(&other)),
        }
    }

    /// Performs a request and returns only the HTTP status code.
    pub fn status(
        &self,
        method: Method,
        path: &str,
        parameters: Parameters,
        context: RequestType,
    ) -> Result<u16> {
        match self.call(method, path, parameters, context, ResponseFormat::Status)? {
            Reply::Status(code) => Ok(code),
            other => Err(unexpected_reply(&other)),
        }
    }

    /// Issues one request and shapes the result according to `format`.
    ///
    /// Non-success statuses are turned into errors: bodies carrying the API's
    /// error envelope become [`DataverseError::Api`], anything else is passed
    /// through as [`DataverseError::Http`].
    pub fn call(
        &self,
        method: Method,
        path: &str,
        parameters: Parameters,
        context: RequestType,
        format: ResponseFormat,
    ) -> Result<Reply> {
        let response = self.perform_request(method, path, parameters, context, format)?;

        if !response.status().is_success() {
            return Err(Self::translate_failure(path, response));
        }

        match format {
            ResponseFormat::Api => {
                let status = response.status().as_u16();
                let envelope: Response<Value> = serde_json::from_str(&response.text()?)?;
                if envelope.status.is_err() {
                    return Err(DataverseError::Api {
                        status,
                        message: envelope.message_text(),
                        endpoint: path.to_string(),
                        trace: TrimmedBacktrace::capture(),
                    });
                }

                // Some endpoints answer with a bare message instead of data
                let data = match (envelope.data, envelope.message) {
                    (Some(data), _) => data,
                    (None, Some(message)) => serde_json::json!({ "message": message.to_string() }),
                    (None, None) => Value::Null,
                };

                Ok(Reply::Api(data))
            }
            ResponseFormat::Json => Ok(Reply::Json(serde_json::from_str(&response.text()?)?)),
            ResponseFormat::Xml => Ok(Reply::Xml(XmlDocument::parse(&response.text()?)?)),
            ResponseFormat::Raw => Ok(Reply::Raw(response)),
            ResponseFormat::Status => Ok(Reply::Status(response.status().as_u16())),
        }
    }

    /// Streams a response body into a sink in fixed-size chunks.
    ///
    /// The status is checked before the sink is opened. A non-success status
    /// yields `Ok(None)` and `open_sink` is never called. On success the number
    /// of bytes written is returned.
    pub fn stream<W, F>(&self, path: &str, parameters: Parameters, open_sink: F) -> Result<Option<u64>>
    where
        W: Write,
        F: FnOnce(Option<u64>) -> std::io::Result<W>,
    {
        let mut response = self.perform_request(
            Method::GET,
            path,
            parameters,
            RequestType::Plain,
            ResponseFormat::Raw,
        )?;

        if !response.status().is_success() {
            tracing::warn!(
                status = response.status().as_u16(),
                endpoint = path,
                "download refused by server"
            );
            return Ok(None);
        }

        let mut sink = open_sink(response.content_length())?;
        let mut buffer = vec![0u8; *CHUNK_SIZE];
        let mut size: u64 = 0;

        loop {
            let read = response.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            sink.write_all(&buffer[..read])?;
            size += read as u64;
        }

        sink.flush()?;
        Ok(Some(size))
    }

    fn perform_request(
        &self,
        method: Method,
        path: &str,
        parameters: Parameters,
        context: RequestType,
        format: ResponseFormat,
    ) -> Result<reqwest::blocking::Response> {
        let url = self.resolve(path)?;
        tracing::debug!(method = %method, url = %url, "calling Dataverse API");

        let request = self.client.request(method, url);
        let request = match format {
            ResponseFormat::Api | ResponseFormat::Json => request.header(ACCEPT, JSON_CONTENT),
            ResponseFormat::Xml => request.header(ACCEPT, XML_CONTENT),
            ResponseFormat::Raw | ResponseFormat::Status => request.header(ACCEPT, "*/*"),
        };

        let request = context.to_request(request)?;
        let request = match parameters {
            Some(parameters) => request.query(&parameters),
            None => request,
        };

        Ok(request.send()?)
    }

    /// Joins a resource path onto the base URL. A leading `/` is ignored.
    fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DataverseError::MalformedInput(format!("invalid path '{path}': {e}")))
    }

    fn translate_failure(path: &str, response: reqwest::blocking::Response) -> DataverseError {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();

        // The pattern only catches the usual key order; anything else is parsed.
        match serde_json::from_str::<Response<Value>>(&body) {
            Ok(envelope) if is_error_envelope(&body) || envelope.status.is_err() => {
                DataverseError::Api {
                    status,
                    message: envelope.message_text(),
                    endpoint: path.to_string(),
                    trace: TrimmedBacktrace::capture(),
                }
            }
            _ => DataverseError::Http {
                status,
                endpoint: path.to_string(),
                body,
            },
        }
    }
}

/// True if the body starts like the API's `{"status":"ERROR","message":"...` envelope.
pub(crate) fn is_error_envelope(body: &str) -> bool {
    ERROR_ENVELOPE
        .as_ref()
        .map(|re| re.find(body).is_some())
        .unwrap_or(false)
}

fn unexpected_reply(reply: &Reply) -> DataverseError {
    DataverseError::UnsupportedType(format!("unexpected reply shape: {reply:?}"))
}
