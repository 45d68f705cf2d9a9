//! Hand-rolled argument parsing for the `kgrank` subcommands.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use kgrank_store::TopicKey;

pub const DEFAULT_TOP: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Summary(CommonArgs),
    Rank {
        common: CommonArgs,
        topics: Vec<TopicKey>,
        top: usize,
    },
    Help,
}

/// Flags shared by every graph command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonArgs {
    pub source: PathBuf,
    pub json: bool,
    /// Drop the cache files before loading.
    pub rebuild: bool,
}

/// Parse everything after the program name.
pub fn parse(args: &[String]) -> anyhow::Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };
    match command.as_str() {
        "--help" | "-h" | "help" => Ok(Command::Help),
        "summary" => {
            let (common, rest) = parse_common(&args[1..])?;
            if let Some(flag) = rest.first() {
                bail!("Unknown option for summary: {}", flag);
            }
            Ok(Command::Summary(common))
        }
        "rank" => {
            let (common, rest) = parse_common(&args[1..])?;
            let mut topics = Vec::new();
            let mut top = DEFAULT_TOP;
            let mut it = rest.into_iter();
            while let Some(flag) = it.next() {
                let mut value = || it.next().ok_or_else(|| anyhow!("{} needs a value", flag));
                match flag.as_str() {
                    "--topic-name" => topics.push(TopicKey::Name(value()?)),
                    "--topic-id" => {
                        let raw = value()?;
                        let id = raw
                            .parse()
                            .with_context(|| format!("--topic-id expects an integer, got {raw}"))?;
                        topics.push(TopicKey::Id(id));
                    }
                    "--top" => {
                        let raw = value()?;
                        top = raw
                            .parse()
                            .with_context(|| format!("--top expects a count, got {raw}"))?;
                    }
                    _ => bail!("Unknown option for rank: {}", flag),
                }
            }
            Ok(Command::Rank {
                common,
                topics,
                top,
            })
        }
        other => bail!("Unknown command: {}. Use 'kgrank help' for usage.", other),
    }
}

/// Pull out the source path and the shared flags; return the remaining arguments.
fn parse_common(args: &[String]) -> anyhow::Result<(CommonArgs, Vec<String>)> {
    let mut source = None;
    let mut json = false;
    let mut rebuild = false;
    let mut rest = Vec::new();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--rebuild" => rebuild = true,
            flag if flag.starts_with("--") => {
                rest.push(arg.clone());
                if let Some(value) = it.next() {
                    rest.push(value.clone());
                }
            }
            _ if source.is_none() => source = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument: {}", arg),
        }
    }
    let source = source.ok_or_else(|| anyhow!("Missing <source> path"))?;
    Ok((
        CommonArgs {
            source,
            json,
            rebuild,
        },
        rest,
    ))
}

pub fn print_usage() {
    println!("kgrank — knowledge graph PageRank");
    println!();
    println!("Usage: kgrank <command> [options]");
    println!();
    println!("Commands:");
    println!("  summary <source>              Node/edge counts per type and structure");
    println!("  rank <source>                 PageRank, or topic PageRank with topics");
    println!("      --topic-name NAME         Bias towards nodes named NAME (repeatable)");
    println!("      --topic-id ID             Bias towards the node with external id ID (repeatable)");
    println!("      --top K                   Number of nodes to print (default {DEFAULT_TOP})");
    println!("  help                          Show this help message");
    println!();
    println!("Options for summary and rank:");
    println!("  --json                        Print JSON instead of text");
    println!("  --rebuild                     Ignore and replace the cache files");
    println!();
    println!("Environment: KGRANK_DATA_DIR, KGRANK_N_ITERS, KGRANK_DAMPING,");
    println!("  KGRANK_TOPIC_PROB, KGRANK_EDGE_TYPES, KGRANK_PRUNE_UNUSED, KGRANK_STRICT,");
    println!("  RUST_LOG");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_no_args_is_help() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(parse(&args("-h")).unwrap(), Command::Help);
    }

    #[test]
    fn test_summary() {
        let cmd = parse(&args("summary dump.jsonl.gz --json")).unwrap();
        assert_eq!(
            cmd,
            Command::Summary(CommonArgs {
                source: PathBuf::from("dump.jsonl.gz"),
                json: true,
                rebuild: false,
            })
        );
        assert!(parse(&args("summary")).is_err());
        assert!(parse(&args("summary a.jsonl --top 3")).is_err());
    }

    #[test]
    fn test_rank_topics() {
        let cmd = parse(&args(
            "rank --rebuild spoke.jsonl --topic-name INS --topic-id 2173881 --top 5",
        ))
        .unwrap();
        let Command::Rank {
            common,
            topics,
            top,
        } = cmd
        else {
            panic!("expected rank");
        };
        assert_eq!(common.source, PathBuf::from("spoke.jsonl"));
        assert!(common.rebuild);
        assert_eq!(
            topics,
            vec![TopicKey::Name("INS".into()), TopicKey::Id(2173881)]
        );
        assert_eq!(top, 5);
    }

    #[test]
    fn test_rank_defaults_and_errors() {
        let Command::Rank { topics, top, .. } = parse(&args("rank g.csv")).unwrap() else {
            panic!("expected rank");
        };
        assert!(topics.is_empty());
        assert_eq!(top, DEFAULT_TOP);

        assert!(parse(&args("rank g.csv --topic-id abc")).is_err());
        assert!(parse(&args("rank g.csv --top")).is_err());
        assert!(parse(&args("rank g.csv --weights 3")).is_err());
        assert!(parse(&args("frobnicate")).is_err());
    }
}
