//! Shared state handed to every request handler.

use crate::auth::TokenIssuer;
use docqa_core::{AppConfig, AppResult};
use docqa_knowledge::DocumentService;
use std::sync::Arc;

/// Application state shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DocumentService>,
    pub tokens: Arc<TokenIssuer>,
    pub auth_required: bool,
}

impl AppState {
    pub fn new(service: DocumentService, config: &AppConfig) -> Self {
        Self {
            service: Arc::new(service),
            tokens: Arc::new(TokenIssuer::new(&config.auth)),
            auth_required: config.auth.required,
        }
    }

    /// Build the service and token issuer described by the configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let service = DocumentService::from_config(config)?;
        Ok(Self::new(service, config))
    }
}
