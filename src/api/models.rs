use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

// ============= Request Models =============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)
    }
}

/// Everything needed to issue the POST. Built once, then only read.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    url: String,
    headers: HashMap<String, String>,
    cookies: Vec<Cookie>,
    body: Map<String, Value>,
}

impl RequestDescriptor {
    pub fn builder(url: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder {
            url: url.into(),
            headers: HashMap::new(),
            cookies: Vec::new(),
            body: Map::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// `Cookie` request header value, `None` when no cookies are attached
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// The user registration POST: bearer auth, JSON body and session cookies
pub fn user_registration(url: &str, created_time: &str) -> RequestDescriptor {
    RequestDescriptor::builder(url)
        .header("Authorization", "Bearer your_token")
        .header("User-Agent", "MyAPI/1.0")
        .header("Content-Type", "application/json")
        .cookie(Cookie::new("session_id", "abc123", "/"))
        .cookie(Cookie::new("user_token", "xyz789", "/"))
        .field("email", "3246g11test288911@gmail.com")
        .field("password", "fghjklhjgf")
        .field("name", "sawerr")
        .field("check", 10)
        .field("created_time", created_time)
        .build()
}

pub struct RequestDescriptorBuilder {
    url: String,
    headers: HashMap<String, String>,
    cookies: Vec<Cookie>,
    body: Map<String, Value>,
}

impl RequestDescriptorBuilder {
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> RequestDescriptor {
        RequestDescriptor {
            url: self.url,
            headers: self.headers,
            cookies: self.cookies,
            body: self.body,
        }
    }
}

// ============= Response Models =============

/// `{"success": bool, "message": string, "data": any}` body shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    /// Lenient parse: a malformed or empty body yields an empty envelope.
    pub fn from_body(body: &str) -> (Self, Option<serde_json::Error>) {
        match serde_json::from_str::<Self>(body) {
            Ok(envelope) => (envelope, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}

/// One completed HTTP exchange
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
    pub envelope: ResponseEnvelope,
    /// Wall time from send to fully read body
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}
