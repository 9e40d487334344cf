use std::fmt;

use nova_java_model::Range;
use serde::{Deserialize, Serialize};

use crate::catalog::DIAGNOSTIC_SOURCE;
use crate::fallback::{FallbackFinding, FallbackProblem};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultToleranceErrorCode {
    FallbackMethodDoesNotExist,
    FallbackMethodInvalidSignature,
}

impl FaultToleranceErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            FaultToleranceErrorCode::FallbackMethodDoesNotExist => "FALLBACK_METHOD_DOES_NOT_EXIST",
            FaultToleranceErrorCode::FallbackMethodInvalidSignature => {
                "FALLBACK_METHOD_INVALID_SIGNATURE"
            }
        }
    }
}

impl fmt::Display for FaultToleranceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// How diagnostic messages format code (the client's document format).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    PlainText,
    #[default]
    Markdown,
}

impl DocumentFormat {
    fn code(self, text: &str) -> String {
        match self {
            DocumentFormat::PlainText => text.to_string(),
            DocumentFormat::Markdown => format!("`{text}`"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
    pub source: String,
    pub code: FaultToleranceErrorCode,
}

impl Diagnostic {
    pub fn error(range: Range, code: FaultToleranceErrorCode, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: Severity::Error,
            source: DIAGNOSTIC_SOURCE.to_string(),
            code,
        }
    }
}

pub fn fallback_diagnostic(finding: &FallbackFinding, format: DocumentFormat) -> Diagnostic {
    match &finding.problem {
        FallbackProblem::MissingMethod { name } => Diagnostic::error(
            finding.range,
            FaultToleranceErrorCode::FallbackMethodDoesNotExist,
            format!("The referenced fallback method '{name}' does not exist"),
        ),
        FallbackProblem::IncompatibleSignature { name, expected } => Diagnostic::error(
            finding.range,
            FaultToleranceErrorCode::FallbackMethodInvalidSignature,
            format!(
                "The referenced fallback method '{name}' has an incompatible signature; expected {}",
                format.code(expected)
            ),
        ),
    }
}

#[cfg(feature = "lsp")]
mod lsp {
    use super::{Diagnostic, Severity};

    fn position(pos: nova_java_model::Position) -> lsp_types::Position {
        lsp_types::Position::new(pos.line, pos.character)
    }

    impl From<Severity> for lsp_types::DiagnosticSeverity {
        fn from(severity: Severity) -> Self {
            match severity {
                Severity::Error => lsp_types::DiagnosticSeverity::ERROR,
                Severity::Warning => lsp_types::DiagnosticSeverity::WARNING,
                Severity::Information => lsp_types::DiagnosticSeverity::INFORMATION,
                Severity::Hint => lsp_types::DiagnosticSeverity::HINT,
            }
        }
    }

    impl From<Diagnostic> for lsp_types::Diagnostic {
        fn from(diagnostic: Diagnostic) -> Self {
            lsp_types::Diagnostic {
                range: lsp_types::Range::new(
                    position(diagnostic.range.start),
                    position(diagnostic.range.end),
                ),
                severity: Some(diagnostic.severity.into()),
                code: Some(lsp_types::NumberOrString::String(
                    diagnostic.code.as_str().to_string(),
                )),
                source: Some(diagnostic.source),
                message: diagnostic.message,
                ..Default::default()
            }
        }
    }

}
