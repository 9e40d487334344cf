mod logging;
mod project;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nova_framework_faulttolerance::{
    Diagnostic, DocumentFormat, FaultToleranceAnalyzer, FaultToleranceConfig,
    JavaDiagnosticsParams, ProjectInfo, SearchScope, Severity,
};
use serde::Serialize;

use crate::project::LoadedProject;

#[derive(Parser)]
#[command(
    name = "nova-mp",
    version,
    about = "MicroProfile Fault Tolerance properties and diagnostics for Java projects"
)]
struct Cli {
    /// Configuration file (defaults to `nova-mp.toml` in the project root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the configuration properties contributed by fault tolerance annotations
    Properties(PropertiesArgs),
    /// Validate `@Fallback` references for a project or a single file
    Diagnostics(DiagnosticsArgs),
}

#[derive(Args)]
struct PropertiesArgs {
    /// Path to a project directory or a single Java file
    path: PathBuf,
    /// Which types participate (defaults to the configured scope)
    #[arg(long, value_enum)]
    scope: Option<ScopeArg>,
    /// Directory of dependency sources, treated as compiled types
    #[arg(long = "dependency", value_name = "DIR")]
    dependencies: Vec<PathBuf>,
    /// Emit JSON suitable for tooling
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DiagnosticsArgs {
    /// Path to a project directory or a single Java file
    path: PathBuf,
    /// Message format (defaults to the configured format)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    SourcesOnly,
    SourcesAndDependencies,
}

impl From<ScopeArg> for SearchScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::SourcesOnly => SearchScope::SourcesOnly,
            ScopeArg::SourcesAndDependencies => SearchScope::SourcesAndDependencies,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Plaintext,
}

impl From<FormatArg> for DocumentFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Markdown => DocumentFormat::Markdown,
            FormatArg::Plaintext => DocumentFormat::PlainText,
        }
    }
}

#[derive(Serialize)]
struct DiagnosticsReport {
    diagnostics: BTreeMap<String, Vec<Diagnostic>>,
    summary: DiagnosticsSummary,
    #[serde(skip)]
    paths: BTreeMap<String, PathBuf>,
}

#[derive(Serialize)]
struct DiagnosticsSummary {
    errors: usize,
    warnings: usize,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Properties(args) => {
            let config = load_config(cli.config.as_deref(), &args.path)?;
            logging::init(&config.logging);

            let scope = args
                .scope
                .map(SearchScope::from)
                .unwrap_or(config.properties.scope);
            let project = LoadedProject::load(&args.path, &args.dependencies)?;
            let analyzer = FaultToleranceAnalyzer::with_config(config);
            let mut info = analyzer.properties(&project.model, scope)?;
            info.project_uri = Some(project.root_uri());
            print_output(&info, args.json)?;
            Ok(0)
        }
        Command::Diagnostics(args) => {
            let config = load_config(cli.config.as_deref(), &args.path)?;
            logging::init(&config.logging);

            let project = LoadedProject::load(&args.path, &[])?;
            let mut params = JavaDiagnosticsParams::new(project.documents.keys().cloned());
            if let Some(format) = args.format {
                params = params.with_format(format.into());
            }
            let analyzer = FaultToleranceAnalyzer::with_config(config);
            let diagnostics = analyzer.java_diagnostics(&project.model, &params)?;

            let count = |severity: Severity| {
                diagnostics
                    .values()
                    .flatten()
                    .filter(|d| d.severity == severity)
                    .count()
            };
            let summary = DiagnosticsSummary {
                errors: count(Severity::Error),
                warnings: count(Severity::Warning),
            };
            let exit = if summary.errors > 0 { 1 } else { 0 };
            let report = DiagnosticsReport {
                diagnostics,
                summary,
                paths: project.documents,
            };
            print_output(&report, args.json)?;
            Ok(exit)
        }
    }
}

fn load_config(explicit: Option<&Path>, path: &Path) -> Result<FaultToleranceConfig> {
    if let Some(file) = explicit {
        return Ok(FaultToleranceConfig::load_from_path(file)?);
    }
    let root = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };
    Ok(FaultToleranceConfig::discover(root)?)
}

fn print_output<T: Serialize + 'static>(value: &T, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
        return Ok(());
    }

    // Human output for key types. Everything else falls back to pretty JSON.
    let any = value as &dyn std::any::Any;
    if let Some(info) = any.downcast_ref::<ProjectInfo>() {
        for item in &info.properties {
            println!(
                "{} ({}) = {}",
                item.name,
                item.ty,
                item.default_value.as_deref().unwrap_or_default()
            );
        }
        println!(
            "summary: {} properties, {} hints",
            info.properties.len(),
            info.hints.len()
        );
    } else if let Some(report) = any.downcast_ref::<DiagnosticsReport>() {
        for (uri, diagnostics) in &report.diagnostics {
            let file = report
                .paths
                .get(uri)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| uri.clone());
            for d in diagnostics {
                println!(
                    "{}:{}:{}: {}[{}] {}",
                    file,
                    d.range.start.line + 1,
                    d.range.start.character + 1,
                    match d.severity {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                        Severity::Information => "info",
                        Severity::Hint => "hint",
                    },
                    d.code,
                    d.message
                );
            }
        }
        println!(
            "summary: {} errors, {} warnings",
            report.summary.errors, report.summary.warnings
        );
    } else {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
    }
    Ok(())
}
