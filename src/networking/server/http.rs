//! Minimal HTTP/1.1 framing for the render endpoint
//!
//! One request per connection: read the head, read a `Content-Length` body,
//! write one response, close. Chunked request bodies are not accepted.

use bytes::{BufMut, Bytes, BytesMut};
use reqwest::StatusCode;
use std::collections::HashMap;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_HEAD_BYTES: usize = 16 * 1024;
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("connection closed before the request was complete")]
    Incomplete,

    #[error("request head exceeds {} bytes", MAX_HEAD_BYTES)]
    HeadTooLarge,

    #[error("request body exceeds {} bytes", MAX_BODY_BYTES)]
    BodyTooLarge,

    #[error("malformed request: {reason}")]
    Malformed { reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

fn malformed(reason: impl Into<String>) -> HttpError {
    HttpError::Malformed { reason: reason.into() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpRequest {
    /// Read one request from `reader`.
    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self, HttpError> {
        let mut buffer = BytesMut::with_capacity(4096);

        let head_end = loop {
            if let Some(pos) = find_subsequence(&buffer, HEAD_TERMINATOR) {
                break pos;
            }
            if buffer.len() > MAX_HEAD_BYTES {
                return Err(HttpError::HeadTooLarge);
            }
            if reader.read_buf(&mut buffer).await? == 0 {
                return Err(HttpError::Incomplete);
            }
        };
        if head_end > MAX_HEAD_BYTES {
            return Err(HttpError::HeadTooLarge);
        }

        let head = buffer.split_to(head_end + HEAD_TERMINATOR.len());
        let mut request = Self::parse_head(&head[..head_end])?;

        let content_length = request.content_length()?;
        if content_length > MAX_BODY_BYTES {
            return Err(HttpError::BodyTooLarge);
        }
        while buffer.len() < content_length {
            if reader.read_buf(&mut buffer).await? == 0 {
                return Err(HttpError::Incomplete);
            }
        }
        buffer.truncate(content_length);
        request.body = buffer.freeze();

        Ok(request)
    }

    /// Parse a request line and headers (without the blank line).
    pub fn parse_head(head: &[u8]) -> Result<Self, HttpError> {
        let text = std::str::from_utf8(head).map_err(|_| malformed("request head is not UTF-8"))?;
        let mut lines = text.split("\r\n");

        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split(' ');
        let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(target), Some(version), None) if !method.is_empty() && !target.is_empty() => {
                (method, target, version)
            }
            _ => return Err(malformed(format!("bad request line {:?}", request_line))),
        };
        if !version.starts_with("HTTP/1.") {
            return Err(malformed(format!("unsupported version {:?}", version)));
        }

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| malformed(format!("bad header line {:?}", line)))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        Ok(Self {
            method: method.to_string(),
            target: target.to_string(),
            headers,
            body: Bytes::new(),
        })
    }

    /// Case-insensitive header lookup; first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn content_length(&self) -> Result<usize, HttpError> {
        if let Some(encoding) = self.header("Transfer-Encoding") {
            if !encoding.eq_ignore_ascii_case("identity") {
                return Err(malformed(format!("unsupported transfer encoding {:?}", encoding)));
            }
        }
        match self.header("Content-Length") {
            Some(raw) => raw.parse().map_err(|_| malformed(format!("bad content length {:?}", raw))),
            None => Ok(0),
        }
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    /// Decoded query parameters. Repeated keys keep their first value.
    pub fn query_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some((_, query)) = self.target.split_once('?') {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
            }
        }
        params
    }

    /// Top-level scalar fields of a JSON object body, as strings. Anything
    /// that is not a JSON object yields no fields.
    pub fn json_fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        if self.body.is_empty() {
            return fields;
        }
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice::<serde_json::Value>(&self.body) {
            for (key, value) in map {
                let text = match value {
                    serde_json::Value::String(text) => text,
                    serde_json::Value::Number(number) => number.to_string(),
                    serde_json::Value::Bool(flag) => flag.to_string(),
                    _ => continue,
                };
                fields.insert(key, text);
            }
        }
        fields
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Successful render. The thumbnail itself is on disk, not in the body.
    pub fn rendered() -> Self {
        Self::new(StatusCode::OK).with_header("Content-Type", "image/png")
    }

    /// Plain-text error with a trailing newline.
    pub fn error(status: StatusCode, message: &str) -> Self {
        let mut response = Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_header("X-Content-Type-Options", "nosniff");
        response.body = Bytes::from(format!("{}\n", message));
        response
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serialize with `Content-Length` and `Connection: close`.
    pub fn encode(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(128 + self.body.len());
        out.put_slice(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status.as_u16(),
                self.status.canonical_reason().unwrap_or("Unknown")
            )
            .as_bytes(),
        );
        for (name, value) in &self.headers {
            out.put_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        out.put_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        out.put_slice(b"Connection: close\r\n\r\n");
        out.put_slice(&self.body);
        out.freeze()
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.encode()).await?;
        writer.flush().await
    }
}
