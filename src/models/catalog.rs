//! Endpoint catalog data models
//!
//! Operations described by the target API's interface description

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods the agent can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether leftover parameters travel in the request body
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation returned by an endpoint lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    /// HTTP method
    pub method: HttpMethod,
    /// Path template, e.g. `/api/categories/{id}`
    #[serde(rename = "path")]
    pub path_template: String,
    /// Short description used for ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Body or query fields the operation cannot do without
    #[serde(rename = "requiredParams", default)]
    pub required_params: Vec<String>,
    /// Fields the operation accepts but does not require
    #[serde(rename = "optionalParams", default)]
    pub optional_params: Vec<String>,
    /// Request schema, kept opaque
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
    /// Whether a bearer token must accompany the call
    #[serde(rename = "authRequired", default)]
    pub auth_required: bool,
}

impl EndpointCandidate {
    /// Names of `{placeholder}` segments in the path template, in order
    pub fn path_params(&self) -> Vec<String> {
        path_params(&self.path_template)
    }
}

/// Placeholder names in a path template, in order of appearance
pub fn path_params(template: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                params.push(after[..end].to_string());
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    params
}
