//! Credential providers
//!
//! Supply the bearer token used for admin operations on the target API

use crate::models::request::BearerToken;

/// Source of a bearer token for the target API
pub trait CredentialProvider: Send + Sync {
    fn get_bearer_token(&self) -> Option<BearerToken>;
}

/// Fixed token, typically taken from the incoming request
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<BearerToken>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        let token = token
            .map(|t| t.trim().trim_start_matches("Bearer ").trim().to_string())
            .filter(|t| !t.is_empty())
            .map(BearerToken::new);
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl CredentialProvider for StaticCredentials {
    fn get_bearer_token(&self) -> Option<BearerToken> {
        self.token.clone()
    }
}
