//! cmodel CLI - cross-platform merge of extracted C FFI models.
//!
//! Extraction itself runs wherever a front end is available (see
//! [`cmodel::frontend::Frontend`]); the CLI operates on the serialized
//! per-platform artifacts: merging them into one cross-platform model and
//! inspecting what an artifact contains.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cmodel::{merge, FfiTargetPlatform};

/// Cross-platform C FFI model tooling.
#[derive(Parser)]
#[command(
    name = "cmodel",
    version,
    about = "Merge and inspect extracted C FFI models"
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output minified JSON (default: pretty-printed)
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge per-platform model artifacts into one cross-platform model
    Merge {
        /// Per-platform artifact files (two or more recommended)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the merged model here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the drop diagnostics in the JSON output
        #[arg(long)]
        with_diagnostics: bool,
    },

    /// Summarize one per-platform artifact
    Show {
        /// Artifact file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Merge {
            inputs,
            output,
            with_diagnostics,
        } => cmd_merge(&inputs, output.as_deref(), with_diagnostics, cli.compact),
        Commands::Show { input } => cmd_show(&input),
    }
}

fn cmd_merge(
    inputs: &[PathBuf],
    output: Option<&Path>,
    with_diagnostics: bool,
    compact: bool,
) -> Result<()> {
    let platforms: Vec<FfiTargetPlatform> = inputs
        .iter()
        .map(|path| read_platform(path))
        .collect::<Result<_>>()?;

    let result = merge(&platforms).context("merge failed")?;
    for diagnostic in &result.diagnostics {
        warn!("{diagnostic}");
    }

    let json = if with_diagnostics {
        to_json(&result, compact)?
    } else {
        to_json(&result.model, compact)?
    };
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_show(input: &Path) -> Result<()> {
    let platform = read_platform(input)?;
    println!(
        "{} (requested {}, pointer size {})",
        platform.platform_actual, platform.platform_requested, platform.pointer_size
    );
    let categories = [
        ("functions", platform.functions.len()),
        ("variables", platform.variables.len()),
        ("records", platform.records.len()),
        ("enums", platform.enums.len()),
        ("type aliases", platform.type_aliases.len()),
        ("opaque types", platform.opaque_types.len()),
        ("function pointers", platform.function_pointers.len()),
        ("macro objects", platform.macro_objects.len()),
    ];
    for (label, count) in categories {
        if count > 0 {
            println!("  {label}: {count}");
        }
    }
    println!("  total: {}", platform.node_count());
    Ok(())
}

fn read_platform(path: &Path) -> Result<FfiTargetPlatform> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let platform: FfiTargetPlatform = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a platform model artifact", path.display()))?;
    if platform.platform_requested.as_str().is_empty() {
        bail!("{} has no requested platform", path.display());
    }
    Ok(platform)
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    Ok(if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    })
}
