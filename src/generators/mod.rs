//! Report generators
//!
//! A generator turns (task, datasource, report definition) into a local
//! file artefact. Generators are stateless per call and safe to invoke
//! concurrently; the factory resolves one by datasource kind.

pub mod kibana;
pub mod rison;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::datasource::{self, DataSourceKind};
use crate::models::report_definition;
use crate::queue::Task;
use crate::secrets::{SecretsError, SecretsManager};

pub use kibana::KibanaGenerator;

/// Result of a successful generation: the rendered artefact on disk.
///
/// The file is kept (not deleted on drop); the caller records its path in
/// the history log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_path: PathBuf,
    pub mime_type: &'static str,
}

/// Errors raised while rendering a report
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("unsupported datasource kind: {0}")]
    UnsupportedKind(String),

    #[error("report '{0}' has no elements to render")]
    NoElements(String),

    #[error("datasource '{0}' requires auth but has no credentials reference")]
    MissingCredentialsRef(String),

    #[error("credential lookup failed for reference '{reference}': {source}")]
    Credentials {
        reference: String,
        #[source]
        source: SecretsError,
    },

    #[error("upstream returned status {status}: {body_excerpt}")]
    Upstream { status: u16, body_excerpt: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid generation url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to persist rendered report: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter rendering a single (datasource, report) pair into a file.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(
        &self,
        task: &Task,
        datasource: &datasource::Model,
        report: &report_definition::Model,
    ) -> Result<RenderedReport, GeneratorError>;
}

/// Resolves a generator by datasource kind.
pub struct GeneratorFactory {
    kibana: Arc<KibanaGenerator>,
}

impl GeneratorFactory {
    pub fn new(secrets: Arc<dyn SecretsManager>) -> Self {
        Self {
            kibana: Arc::new(KibanaGenerator::new(secrets)),
        }
    }

    /// Resolve the generator for a datasource kind string.
    ///
    /// `grafana` is a declared kind with no generator wired up yet; it
    /// fails the same way an unknown kind does.
    pub fn for_kind(&self, kind: &str) -> Result<Arc<dyn ReportGenerator>, GeneratorError> {
        match DataSourceKind::parse(kind) {
            Some(DataSourceKind::Kibana) => Ok(self.kibana.clone()),
            Some(DataSourceKind::Grafana) | None => {
                Err(GeneratorError::UnsupportedKind(kind.to_string()))
            }
        }
    }
}
