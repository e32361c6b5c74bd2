//! Composed API client
//!
//! [`Client`] is the single entry point: one transport shared behind an
//! `Arc`, with the per-resource operations implemented in the
//! [`crate::endpoints`] modules as separate `impl Client` blocks.

use std::sync::Arc;

use strata_domain::Result;

use crate::config::ClientConfig;
use crate::transport::Transport;

/// Handle to the analytics service API. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    transport: Arc<Transport>,
}

impl Client {
    /// Build a client for the default endpoints with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::builder().api_key(api_key).build())
    }

    /// Build a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self { transport: Arc::new(Transport::new(config)?) })
    }

    /// Build a client from `STRATA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }
}
