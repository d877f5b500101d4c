//! Command-line driver for the Python backend.
//!
//! Reads a resolved model set from JSON, validates it, and writes the
//! generated Python package tree to the output directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use modelpy_codegen::generate_all;
use modelpy_model::{parse_models, validate_models};

#[derive(Debug, Parser)]
#[command(name = "modelpy", version, about = "Generate Python from resolved domain models")]
struct Cli {
    /// Resolved model set, JSON (a single model object or an array).
    source: PathBuf,

    /// Directory the generated package tree is written to.
    #[arg(short, long, default_value = "generated")]
    output: PathBuf,

    /// Generate even when the model set fails validation.
    #[arg(long)]
    allow_validation_errors: bool,

    /// Treat validation warnings as errors.
    #[arg(long)]
    fail_on_warnings: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = i32::from(err.use_stderr());
            let _ = err.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    if let Err(error) = run(&cli) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let json = fs::read_to_string(&cli.source)
        .with_context(|| format!("reading {}", cli.source.display()))?;
    let models = parse_models(&json).context("parsing model set")?;

    let report = validate_models(&models);
    for warning in &report.warnings {
        warn!("{warning}");
    }
    if !report.is_ok() {
        for error in &report.errors {
            warn!("{error}");
        }
        if !cli.allow_validation_errors {
            bail!("model set failed validation with {} error(s)", report.errors.len());
        }
    }
    if cli.fail_on_warnings && !report.warnings.is_empty() {
        bail!("{} validation warning(s)", report.warnings.len());
    }

    let output = generate_all(&models);
    for (path, content) in &output.files {
        let target = cli.output.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&target, content).with_context(|| format!("writing {}", target.display()))?;
    }
    info!(
        files = output.files.len(),
        output = %cli.output.display(),
        "generation finished"
    );

    if !output.failures.is_empty() {
        for (namespace, error) in &output.failures {
            warn!(%namespace, "skipped: {error}");
        }
        bail!("{} namespace(s) failed to generate", output.failures.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_JSON: &str = r#"{
        "namespace": "demo",
        "version": "1.0.0",
        "composites": [
            {
                "name": "Foo",
                "namespace": "demo",
                "attributes": [
                    {
                        "name": "bar",
                        "type_ref": {"Basic": "String"},
                        "cardinality": {"min": 0, "max": 1}
                    }
                ]
            }
        ]
    }"#;

    fn cli(source: PathBuf, output: PathBuf) -> Cli {
        Cli {
            source,
            output,
            allow_validation_errors: false,
            fail_on_warnings: false,
        }
    }

    #[test]
    fn test_run_writes_package_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("model.json");
        fs::write(&source, MODEL_JSON).expect("write model");
        let output = dir.path().join("out");

        run(&cli(source, output.clone())).expect("run");

        assert!(output.join("pyproject.toml").is_file());
        assert!(output.join("src/demo/_bundle.py").is_file());
        assert!(output.join("src/demo/Foo.py").is_file());
        let bundle = fs::read_to_string(output.join("src/demo/_bundle.py")).expect("read");
        assert!(bundle.contains("class demo_Foo(BaseDataClass):"));
    }

    #[test]
    fn test_run_rejects_missing_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run(&cli(dir.path().join("absent.json"), dir.path().join("out")));
        assert!(result.is_err());
    }

    #[test]
    fn test_run_rejects_invalid_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("model.json");
        // Unresolved supertype fails validation.
        fs::write(
            &source,
            r#"{
                "namespace": "demo",
                "version": "1.0.0",
                "composites": [
                    {
                        "name": "Foo",
                        "namespace": "demo",
                        "supertype": {"Named": {"namespace": "demo", "name": "Missing"}}
                    }
                ]
            }"#,
        )
        .expect("write model");
        let result = run(&cli(source, dir.path().join("out")));
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "modelpy",
            "model.json",
            "--output",
            "dist",
            "--allow-validation-errors",
        ])
        .expect("parse");
        assert_eq!(cli.output, PathBuf::from("dist"));
        assert!(cli.allow_validation_errors);
        assert!(!cli.fail_on_warnings);
    }
}
