mod annotations;
mod config;
mod descriptor;
mod engine;
mod ir;
mod predicates;
mod proxy;
mod rules;
mod scan;
mod schema;
mod self_invocation;
mod stereotypes;
#[cfg(test)]
mod test_harness;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde_json::json;
use serde_sarif::sarif::{
    Artifact, Invocation, MultiformatMessageString, ReportingDescriptor, Result as SarifResult,
    Run, SCHEMA_URL, Sarif, Tool, ToolComponent,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{RuleConfig, configured_rules, load_config};
use crate::engine::build_context;
use crate::rules::{Rule, RuleMetadata};
use crate::scan::scan_inputs;

/// CLI arguments for proxylint execution.
#[derive(Parser, Debug)]
#[command(
    name = "proxylint",
    about = "Deterministic SARIF output for proxy bypasses in annotation-driven JVM programs.",
    version
)]
struct Cli {
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    #[arg(long, value_name = "PATH")]
    classpath: Vec<PathBuf>,
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    #[arg(long)]
    quiet: bool,
    #[arg(long)]
    timing: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);
    run(cli)
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "error" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if !cli.input.exists() {
        anyhow::bail!("input not found: {}", cli.input.display());
    }
    for entry in &cli.classpath {
        if !entry.exists() {
            anyhow::bail!("classpath entry not found: {}", entry.display());
        }
    }

    let rule_config = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => RuleConfig::default(),
    };
    let rules = configured_rules(&rule_config)?;

    let started_at = Instant::now();
    let scan = scan_inputs(&cli.input, &cli.classpath)?;
    let context = build_context(scan.classes, &scan.artifacts)
        .context("inconsistent program model")?;
    let results = run_rules(&rules, &context)?;
    info!(
        rules = rules.len(),
        classes = context.class_count(),
        results = results.len(),
        "analysis finished"
    );

    let artifact_count = scan.artifacts.len();
    let result_count = results.len();
    let metadata: Vec<RuleMetadata> = rules.iter().map(Rule::metadata).collect();
    let invocation = build_invocation();
    let sarif = build_sarif(scan.artifacts, invocation, &metadata, results);

    let mut writer = output_writer(cli.output.as_deref())?;
    serde_json::to_writer_pretty(&mut writer, &sarif)
        .context("failed to serialize SARIF output")?;
    writer
        .write_all(b"\n")
        .context("failed to write SARIF output")?;

    if cli.timing && !cli.quiet {
        eprintln!(
            "timing: total_ms={} classes={} artifacts={} results={}",
            started_at.elapsed().as_millis(),
            context.class_count(),
            artifact_count,
            result_count
        );
    }

    Ok(())
}

/// Evaluate rules in parallel; results keep rule declaration order.
fn run_rules<R: Rule>(rules: &[R], context: &engine::AnalysisContext) -> Result<Vec<SarifResult>> {
    let per_rule = rules
        .par_iter()
        .map(|rule| {
            rule.run(context)
                .with_context(|| format!("rule {} failed", rule.metadata().id))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(per_rule.into_iter().flatten().collect())
}

fn output_writer(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) if path == Path::new("-") => Ok(Box::new(io::stdout())),
        Some(path) => Ok(Box::new(
            File::create(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Ok(Box::new(io::stdout())),
    }
}

fn build_invocation() -> Invocation {
    let arguments: Vec<String> = std::env::args().collect();
    let command_line = arguments.join(" ");

    Invocation::builder()
        .execution_successful(true)
        .arguments(arguments)
        .command_line(command_line)
        .build()
}

fn build_sarif(
    artifacts: Vec<Artifact>,
    invocation: Invocation,
    rules: &[RuleMetadata],
    results: Vec<SarifResult>,
) -> Sarif {
    let descriptors: Vec<ReportingDescriptor> = rules
        .iter()
        .map(|rule| {
            ReportingDescriptor::builder()
                .id(rule.id.clone())
                .name(rule.name.clone())
                .short_description(
                    MultiformatMessageString::builder()
                        .text(rule.description.clone())
                        .build(),
                )
                .build()
        })
        .collect();
    let driver = ToolComponent::builder()
        .name("proxylint")
        .rules(descriptors)
        .build();
    let tool = Tool {
        driver,
        extensions: None,
        properties: None,
    };
    let run = if artifacts.is_empty() {
        Run::builder()
            .tool(tool)
            .invocations(vec![invocation])
            .results(results)
            .build()
    } else {
        Run::builder()
            .tool(tool)
            .invocations(vec![invocation])
            .results(results)
            .artifacts(artifacts)
            .build()
    };

    Sarif::builder()
        .schema(SCHEMA_URL)
        .runs(vec![run])
        .version(json!("2.1.0"))
        .build()
}
