use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use phpdoc_typecheck::diagnostics::render_json;
use phpdoc_typecheck::{CheckError, Checker, Config, FileReport, OutputFormat};

#[derive(Parser)]
#[command(name = "phpdoc-typecheck", version)]
#[command(about = "Check PHPDoc type annotations against native PHP signatures")]
struct Cli {
    /// Files or directories to check.  Directories are walked, honouring
    /// `.gitignore`.
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Rewrite doc types that don't conform to the recommended style.
    #[arg(long)]
    fix: bool,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Fail on internal errors instead of reporting a file-level
    /// diagnostic.
    #[arg(long)]
    strict: bool,

    /// Config file to use instead of the default search path.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `phpdoc_typecheck=trace`.  Overrides
    /// `RUST_LOG`.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match run(&cli) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "aborting");
            eprintln!("phpdoc-typecheck: {err}");
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::builder().parse_lossy(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Check every requested file.  Returns whether any error was reported.
fn run(cli: &Cli) -> Result<bool, CheckError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.strict {
        config.strict = true;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    let checker = Checker::new(&config);
    let mut reports = Vec::new();
    for path in &cli.paths {
        for file in collect_files(path, &config)? {
            let report = checker.check_file(&file)?;
            if cli.fix {
                write_fixes(&report)?;
            }
            reports.push(report);
        }
    }

    let has_errors = reports.iter().any(|r| r.error_count() > 0);
    let mut stdout = std::io::stdout().lock();
    let output = match config.format {
        OutputFormat::Text => reports.iter().map(FileReport::render_text).collect(),
        OutputFormat::Json => {
            let mut json = render_json(&reports)?;
            json.push('\n');
            json
        }
    };
    stdout
        .write_all(output.as_bytes())
        .map_err(|source| CheckError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })?;

    Ok(has_errors)
}

/// Expand a CLI path into the files to check.
///
/// A file named explicitly is always checked; files found by walking a
/// directory are filtered by extension and the `exclude` globs.
fn collect_files(root: &Path, config: &Config) -> Result<Vec<PathBuf>, CheckError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let walk_error = |err: ignore::Error| CheckError::Config {
        path: root.to_path_buf(),
        message: err.to_string(),
    };

    let mut overrides = OverrideBuilder::new(root);
    for pattern in &config.exclude {
        overrides
            .add(&format!("!{pattern}"))
            .map_err(walk_error)?;
    }
    let overrides = overrides.build().map_err(walk_error)?;

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).overrides(overrides).build() {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_some_and(|t| t.is_file()) && config.wants_extension(entry.path())
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(root = %root.display(), files = files.len(), "collected files");
    Ok(files)
}

/// Apply the report's fixes to its file, replacing it atomically.
fn write_fixes(report: &FileReport) -> Result<(), CheckError> {
    if report.diagnostics.iter().all(|d| d.fix.is_none()) {
        return Ok(());
    }
    let io_error = |source: std::io::Error| CheckError::Io {
        path: report.path.clone(),
        source,
    };

    let source = std::fs::read_to_string(&report.path).map_err(io_error)?;
    let fixed = phpdoc_typecheck::diagnostics::apply_fixes(&source, &report.diagnostics);
    if fixed == source {
        return Ok(());
    }

    let dir = report
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
    temp.write_all(fixed.as_bytes()).map_err(io_error)?;
    temp.persist(&report.path)
        .map_err(|err| io_error(err.error))?;
    debug!(path = %report.path.display(), "fixed");
    Ok(())
}
