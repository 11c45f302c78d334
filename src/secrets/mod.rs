//! Credential resolution for datasource authentication.
//!
//! The engine never stores credentials; datasources carry an opaque
//! reference string that a [`SecretsManager`] resolves at generation time.
//! The mock implementation is what the binary wires in today: a real
//! secrets backend (e.g. Vault) slots in behind the same trait.

use async_trait::async_trait;
use thiserror::Error;

/// Sentinel reference resolved by the mock manager.
const MOCK_KIBANA_REF: &str = "kv/report-scheduler/kibana-prod";

/// Credentials returned by a lookup; only the fields relevant to the
/// datasource's auth kind are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub token: String,
}

/// Errors raised by credential lookups
#[derive(Debug, Clone, Error)]
pub enum SecretsError {
    #[error("no credentials found for reference '{0}'")]
    NotFound(String),
    #[error("secrets backend unavailable: {0}")]
    Unavailable(String),
}

/// Value-lookup oracle mapping an opaque reference to credentials.
#[async_trait]
pub trait SecretsManager: Send + Sync {
    async fn get_credentials(&self, reference: &str) -> Result<Credentials, SecretsError>;
}

/// Mock secrets manager used by the binary and by tests.
#[derive(Debug, Default)]
pub struct MockSecretsManager {
    /// When set, returned for every lookup
    creds_to_return: Option<Credentials>,
    /// When set, every lookup fails with this error
    err_to_return: Option<SecretsError>,
}

impl MockSecretsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every lookup to return the given credentials.
    pub fn with_credentials(creds: Credentials) -> Self {
        Self {
            creds_to_return: Some(creds),
            err_to_return: None,
        }
    }

    /// Force every lookup to fail.
    pub fn with_error(err: SecretsError) -> Self {
        Self {
            creds_to_return: None,
            err_to_return: Some(err),
        }
    }
}

#[async_trait]
impl SecretsManager for MockSecretsManager {
    async fn get_credentials(&self, reference: &str) -> Result<Credentials, SecretsError> {
        if let Some(err) = &self.err_to_return {
            return Err(err.clone());
        }
        if let Some(creds) = &self.creds_to_return {
            return Ok(creds.clone());
        }
        if reference == MOCK_KIBANA_REF {
            return Ok(Credentials {
                token: "mock-api-token-12345".to_string(),
                ..Credentials::default()
            });
        }
        Err(SecretsError::NotFound(reference.to_string()))
    }
}
