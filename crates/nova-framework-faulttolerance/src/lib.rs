//! MicroProfile Fault Tolerance intelligence for Nova.
//!
//! - Configuration property discovery: every `@Asynchronous`, `@Bulkhead`,
//!   `@CircuitBreaker`, `@Fallback`, `@Retry` and `@Timeout` usage contributes
//!   overridable properties at method (`<class>/<method>/<Annotation>/<param>`),
//!   class (`<class>/<Annotation>/<param>`) and global (`<Annotation>/<param>`)
//!   level, plus the `MP_Fault_Tolerance_NonFallback_Enabled` switch.
//! - Java diagnostics for `@Fallback(fallbackMethod = ...)` references
//!   (`FALLBACK_METHOD_DOES_NOT_EXIST`, `FALLBACK_METHOD_INVALID_SIGNATURE`).

pub mod catalog;
mod config;
mod diagnostics;
mod fallback;
mod occurrence;
mod properties;

pub use config::{
    ConfigError, DiagnosticsConfig, FaultToleranceConfig, LoggingConfig, PropertiesConfig,
    CONFIG_FILE_NAME,
};
pub use diagnostics::{
    fallback_diagnostic, Diagnostic, DocumentFormat, FaultToleranceErrorCode, Severity,
};
pub use fallback::{expected_signature, is_compatible, FallbackFinding, FallbackProblem};
pub use occurrence::{config_literal, occurrences, AnnotationOccurrence, Target};

pub use nova_java_model::{ModelError, SearchScope};
pub use nova_microprofile_metadata::{ItemHint, ItemMetadata, ProjectInfo, ValueHint};

use std::collections::BTreeMap;

use nova_java_model::JavaModel;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaultToleranceError {
    #[error("type model unavailable: {0}")]
    TypeModelUnavailable(#[from] ModelError),
}

/// Documents to validate in one diagnostics request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JavaDiagnosticsParams {
    pub uris: Vec<String>,
    /// Overrides the configured format when set.
    pub document_format: Option<DocumentFormat>,
}

impl JavaDiagnosticsParams {
    pub fn new<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uris: uris.into_iter().map(Into::into).collect(),
            document_format: None,
        }
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.document_format = Some(format);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct FaultToleranceAnalyzer {
    config: FaultToleranceConfig,
}

impl FaultToleranceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FaultToleranceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FaultToleranceConfig {
        &self.config
    }

    /// Properties and hints contributed by the fault tolerance annotations of
    /// the project in `scope`.
    ///
    /// The result is ordered and deduplicated by property name (first wins).
    /// It always ends with `MP_Fault_Tolerance_NonFallback_Enabled`.
    pub fn properties(
        &self,
        model: &dyn JavaModel,
        scope: SearchScope,
    ) -> Result<ProjectInfo, FaultToleranceError> {
        properties::collect_properties(model, scope)
    }

    /// [`Self::properties`] in the configured scope.
    pub fn project_properties(
        &self,
        model: &dyn JavaModel,
    ) -> Result<ProjectInfo, FaultToleranceError> {
        self.properties(model, self.config.properties.scope)
    }

    /// Diagnostics per requested document. Every requested URI gets an entry,
    /// possibly empty.
    pub fn java_diagnostics(
        &self,
        model: &dyn JavaModel,
        params: &JavaDiagnosticsParams,
    ) -> Result<BTreeMap<String, Vec<Diagnostic>>, FaultToleranceError> {
        let settings = &self.config.diagnostics;
        let format = params.document_format.unwrap_or(settings.document_format);
        let mut out = BTreeMap::new();

        for uri in &params.uris {
            let mut diagnostics = Vec::new();
            if settings.enabled {
                let ids = match model.types_in_document(uri) {
                    Ok(ids) => ids,
                    Err(ModelError::UnknownDocument(_)) => {
                        tracing::warn!(
                            target = "nova.microprofile",
                            uri = %uri,
                            "diagnostics requested for unknown document"
                        );
                        Vec::new()
                    }
                    Err(err) => return Err(err.into()),
                };

                for id in ids {
                    let findings =
                        match fallback::validate_type(model, id, settings.fallback_signature) {
                            Ok(findings) => findings,
                            Err(err) => {
                                tracing::warn!(
                                    target = "nova.microprofile",
                                    uri = %uri,
                                    type_id = id.to_raw(),
                                    error = %err,
                                    "skipping unreadable type"
                                );
                                continue;
                            }
                        };
                    diagnostics.extend(
                        findings
                            .iter()
                            .map(|finding| fallback_diagnostic(finding, format)),
                    );
                }
            }
            out.insert(uri.clone(), diagnostics);
        }

        Ok(out)
    }
}
