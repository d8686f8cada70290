use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cueflow_bus::{CommandBus, DEFAULT_TIMEOUT_MS, DEFAULT_WAAPI_URL, MemoryBus, WaapiBus, WaapiConfig};
use cueflow_compiler::{CompilationReport, Compiler};
use cueflow_config::WorkflowDef;
use cueflow_engine::{Engine, ExecutionOptions, TracingNotifier};
use cueflow_registry::StepRegistry;
use cueflow_steps::builtin_registry;

/// Cueflow - compile and run node-graph automations against Wwise
#[derive(Parser)]
#[command(name = "cueflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// WAAPI HTTP endpoint
  #[arg(long, global = true, env = "CUEFLOW_WAAPI_URL", default_value = DEFAULT_WAAPI_URL)]
  waapi_url: String,

  /// Request timeout in milliseconds
  #[arg(long, global = true, env = "CUEFLOW_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
  timeout_ms: u64,

  /// Run against an in-memory project instead of WAAPI
  #[arg(long, global = true)]
  offline: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List the available node types
  Nodes {
    /// Only list types in this category
    #[arg(long)]
    category: Option<String>,
  },

  /// Compile a workflow into an execution plan
  Compile {
    /// Path to the workflow JSON file, or - for stdin
    workflow_file: PathBuf,
  },

  /// Compile a workflow and run pre-flight checks
  Validate {
    /// Path to the workflow JSON file, or - for stdin
    workflow_file: PathBuf,
  },

  /// Compile and execute a workflow
  Run {
    /// Path to the workflow JSON file, or - for stdin
    workflow_file: PathBuf,

    /// Return the plan without executing it
    #[arg(long)]
    dry_run: bool,

    /// Skip steps until this node id is reached
    #[arg(long)]
    resume_from: Option<String>,

    /// Ignore memoized results
    #[arg(long)]
    force_rerun: bool,
  },
}

fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cueflow=info,warn")),
    )
    .with_target(false)
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let registry = Arc::new(builtin_registry().context("failed to build step registry")?);

  match cli.command {
    Some(Commands::Nodes { category }) => {
      list_nodes(&registry, category.as_deref())?;
      Ok(ExitCode::SUCCESS)
    }
    Some(Commands::Compile { workflow_file }) => {
      let report = Compiler::new(registry).compile_value(read_workflow(&workflow_file)?);
      let report = CompilationReport::from(report);
      print_report(&report, report.ok)
    }
    Some(Commands::Validate { workflow_file }) => {
      let value = read_workflow(&workflow_file)?;
      let compiler = Compiler::new(registry);
      let report = match serde_json::from_value::<WorkflowDef>(value) {
        Ok(def) => compiler.validate(&def),
        Err(e) => CompilationReport::failure(&cueflow_compiler::CompileError::Failed {
          message: e.to_string(),
        }),
      };
      print_report(&report, report.ok)
    }
    Some(Commands::Run {
      workflow_file,
      dry_run,
      resume_from,
      force_rerun,
    }) => {
      let options = ExecutionOptions {
        dry_run,
        resume_from,
        force_rerun,
      };
      let bus = command_bus(&cli.waapi_url, cli.timeout_ms, cli.offline)?;
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { run_workflow(&workflow_file, registry, bus, &options).await })
    }
    None => {
      println!("cueflow - use --help to see available commands");
      Ok(ExitCode::SUCCESS)
    }
  }
}

async fn run_workflow(
  workflow_file: &Path,
  registry: Arc<StepRegistry>,
  bus: Arc<dyn CommandBus>,
  options: &ExecutionOptions,
) -> Result<ExitCode> {
  let value = read_workflow(workflow_file)?;

  let engine = Engine::with_notifier(registry, bus, TracingNotifier);
  let report = engine.run_value(value, options).await;

  print_report(&report, report.ok)
}

fn command_bus(url: &str, timeout_ms: u64, offline: bool) -> Result<Arc<dyn CommandBus>> {
  if offline {
    return Ok(Arc::new(MemoryBus::new()));
  }

  let config = WaapiConfig::new(url, timeout_ms).context("invalid WAAPI configuration")?;
  let bus = WaapiBus::new(config).context("failed to create WAAPI client")?;
  Ok(Arc::new(bus))
}

fn list_nodes(registry: &StepRegistry, category: Option<&str>) -> Result<()> {
  let nodes: Vec<_> = registry
    .describe()
    .into_iter()
    .filter(|info| category.is_none_or(|c| info.category == c))
    .collect();

  println!("{}", serde_json::to_string_pretty(&nodes)?);
  Ok(())
}

fn print_report<T: Serialize>(report: &T, ok: bool) -> Result<ExitCode> {
  println!("{}", serde_json::to_string_pretty(report)?);
  Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Read a workflow document from a file, or from stdin when the path is `-`.
fn read_workflow(path: &Path) -> Result<Value> {
  let content = if path == Path::new("-") {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read workflow from stdin")?;
    input
  } else {
    std::fs::read_to_string(path)
      .with_context(|| format!("failed to read workflow file: {}", path.display()))?
  };

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", path.display()))
}
