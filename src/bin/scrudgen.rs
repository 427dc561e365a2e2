use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use scrudgen::prelude::*;

#[derive(Parser)]
#[command(name = "scrudgen")]
#[command(about = "Generate DTOs, mappers, repositories, services and controllers from a model manifest")]
struct Cli {
    /// Model manifest (TOML)
    manifest: PathBuf,
    /// Directory receiving generated artifacts
    #[arg(short, long, default_value = "generated")]
    output: PathBuf,
    /// Hand-written source root; artifacts found here are not regenerated (repeatable)
    #[arg(short, long = "source-root")]
    source_root: Vec<PathBuf>,
    /// Write the run report as TOML to this file
    #[arg(short, long)]
    report: Option<PathBuf>,
}

fn run(cli: Cli) -> ScrudResult<RunReport> {
    let manifest = parse_manifest(&cli.manifest)?;
    let config = GeneratorConfig::from_section(&manifest.generator, &cli.output, cli.source_root)?;
    let store = FsArtifactStore::new(&config.output_root)
        .with_source_roots(config.source_roots.iter().cloned());
    let mut orchestrator = Orchestrator::new(config, store)?;

    let report = match orchestrator.run(&manifest)? {
        RunOutcome::Completed(report) => report,
        RunOutcome::AlreadyRan => RunReport::default(),
    };
    if let Some(path) = &cli.report {
        std::fs::write(path, report.to_toml()?)?;
    }
    Ok(report)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let report = match run(Cli::parse()) {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    for model in &report.models {
        match &model.reason {
            Some(reason) => println!("{:<40} {:<20} {reason}", model.model, model.status),
            None => println!("{:<40} {}", model.model, model.status),
        }
    }
    println!(
        "{} written, {} skipped, {} failed",
        report.count(OutcomeKind::Written),
        report.count(OutcomeKind::SkippedExisting),
        report.count(OutcomeKind::Failed)
    );

    if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
