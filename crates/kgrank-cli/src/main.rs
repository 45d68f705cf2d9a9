//! kgrank — ingest a knowledge graph dump and rank its nodes.

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod report;

use args::{Command, CommonArgs};
use kgrank_core::KgRankConfig;
use kgrank_runtime::Orchestrator;

fn resolve_data_dir() -> PathBuf {
    std::env::var("KGRANK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn orchestrator(common: &CommonArgs) -> anyhow::Result<Orchestrator> {
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = KgRankConfig::from_env(&data_dir)?;
    let orch = Orchestrator::new(config);
    if common.rebuild {
        orch.clear_cache()?;
    }
    Ok(orch)
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let command = match args::parse(&argv) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    match command {
        Command::Help => args::print_usage(),
        Command::Summary(common) => {
            let orch = orchestrator(&common)?;
            let (summary, origin) = orch.summary(&common.source)?;
            if common.json {
                let out = serde_json::json!({ "load": origin, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                report::print_origin(&origin);
                println!();
                report::print_summary(&summary);
            }
        }
        Command::Rank {
            common,
            topics,
            top,
        } => {
            let orch = orchestrator(&common)?;
            let loaded = orch.load(&common.source)?;
            let origin = loaded.origin.clone();
            let outcome = orch.rank(loaded, &topics, top)?;
            if common.json {
                let out = serde_json::json!({ "load": origin, "rank": outcome });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                report::print_origin(&origin);
                println!();
                report::print_rank(&outcome);
            }
        }
    }

    Ok(())
}
