use nova_framework_faulttolerance::{
    Diagnostic, DocumentFormat, FaultToleranceAnalyzer, FaultToleranceConfig,
    FaultToleranceErrorCode, JavaDiagnosticsParams, Severity,
};
use nova_java_model::{MemoryJavaModel, ProjectBuilder, Range};
use pretty_assertions::assert_eq;

const FAULT_TOLERANT: &str = "file:///src/org/acme/FaultTolerantResource.java";
const OTHER: &str = "file:///src/org/acme/OtherFaultTolerantResource.java";
const BAD_SIGNATURE: &str = "file:///src/org/acme/BadSignatureResource.java";

fn model() -> MemoryJavaModel {
    let mut builder = ProjectBuilder::new("demo");
    builder
        .add_source(
            FAULT_TOLERANT,
            include_str!("fixtures/FaultTolerantResource.java"),
        )
        .add_source(OTHER, include_str!("fixtures/OtherFaultTolerantResource.java"))
        .add_source(BAD_SIGNATURE, include_str!("fixtures/BadSignatureResource.java"));
    builder.build().expect("fixtures parse")
}

fn diagnostics(analyzer: &FaultToleranceAnalyzer, params: JavaDiagnosticsParams) -> Vec<Diagnostic> {
    let uri = params.uris[0].clone();
    let mut by_uri = analyzer
        .java_diagnostics(&model(), &params)
        .expect("diagnostics run");
    by_uri.remove(&uri).unwrap_or_default()
}

#[test]
fn missing_fallback_method() {
    let found = diagnostics(
        &FaultToleranceAnalyzer::new(),
        JavaDiagnosticsParams::new([FAULT_TOLERANT]),
    );
    assert_eq!(
        found,
        vec![Diagnostic {
            range: Range::on_line(14, 31, 36),
            message: "The referenced fallback method 'aaa' does not exist".into(),
            severity: Severity::Error,
            source: "microprofile-faulttolerance".into(),
            code: FaultToleranceErrorCode::FallbackMethodDoesNotExist,
        }]
    );
}

#[test]
fn valid_fallback_methods() {
    let found = diagnostics(
        &FaultToleranceAnalyzer::new(),
        JavaDiagnosticsParams::new([OTHER]),
    );
    assert_eq!(found, Vec::new());
}

#[test]
fn incompatible_fallback_signature() {
    let found = diagnostics(
        &FaultToleranceAnalyzer::new(),
        JavaDiagnosticsParams::new([BAD_SIGNATURE]),
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].range, Range::on_line(6, 31, 40));
    assert_eq!(
        found[0].code,
        FaultToleranceErrorCode::FallbackMethodInvalidSignature
    );
    assert_eq!(
        found[0].message,
        "The referenced fallback method 'recover' has an incompatible signature; expected `String recover(int)`"
    );

    let plain = diagnostics(
        &FaultToleranceAnalyzer::new(),
        JavaDiagnosticsParams::new([BAD_SIGNATURE]).with_format(DocumentFormat::PlainText),
    );
    assert_eq!(
        plain[0].message,
        "The referenced fallback method 'recover' has an incompatible signature; expected String recover(int)"
    );
}

#[test]
fn signature_check_is_configurable() {
    let mut config = FaultToleranceConfig::default();
    config.diagnostics.fallback_signature = false;
    let found = diagnostics(
        &FaultToleranceAnalyzer::with_config(config),
        JavaDiagnosticsParams::new([BAD_SIGNATURE]),
    );
    assert_eq!(found, Vec::new());
}

#[test]
fn every_requested_document_gets_an_entry() {
    let analyzer = FaultToleranceAnalyzer::new();
    let result = analyzer
        .java_diagnostics(
            &model(),
            &JavaDiagnosticsParams::new([OTHER, FAULT_TOLERANT, "file:///src/Missing.java"]),
        )
        .unwrap();

    let counts: Vec<_> = result.iter().map(|(uri, d)| (uri.as_str(), d.len())).collect();
    assert_eq!(
        counts,
        vec![
            ("file:///src/Missing.java", 0),
            (FAULT_TOLERANT, 1),
            (OTHER, 0),
        ]
    );
}
