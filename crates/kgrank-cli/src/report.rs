//! Plain-text output for the graph commands.

use kgrank_runtime::{LoadOrigin, RankOutcome};
use kgrank_store::GraphSummary;

pub fn print_origin(origin: &LoadOrigin) {
    match origin {
        LoadOrigin::Cached => println!("Source:             restored from cache"),
        LoadOrigin::Ingested {
            report,
            matrix_cached,
        } => {
            println!("Source:             ingested ({} records)", report.records_read);
            println!(
                "Matrix:             {}",
                if *matrix_cached { "cached" } else { "built" }
            );
            if report.edges_filtered > 0 {
                println!("Edges filtered:     {}", report.edges_filtered);
            }
            if report.edges_overwritten > 0 {
                println!("Edges overwritten:  {}", report.edges_overwritten);
            }
            if report.malformed_skipped > 0 {
                println!("Records skipped:    {}", report.malformed_skipped);
            }
            if report.nodes_pruned > 0 {
                println!("Nodes pruned:       {}", report.nodes_pruned);
            }
            if report.dangling_edges_dropped > 0 {
                println!("Dangling dropped:   {}", report.dangling_edges_dropped);
            }
        }
    }
}

pub fn print_summary(summary: &GraphSummary) {
    println!("=== Graph Summary ===");
    println!();
    println!("Nodes:              {}", summary.node_count);
    println!("Edges:              {}", summary.edge_count);
    println!("Dangling nodes:     {}", summary.dangling_nodes);
    println!("Isolated nodes:     {}", summary.isolated_nodes);
    println!("Weak components:    {}", summary.weak_components);

    println!();
    println!("Node types:");
    for (label, count) in &summary.node_type_counts {
        println!("  {:<32} {}", label, count);
    }
    println!();
    println!("Edge types:");
    for (label, count) in &summary.edge_type_counts {
        println!("  {:<32} {}", label, count);
    }
}

pub fn print_rank(outcome: &RankOutcome) {
    if outcome.topics.is_empty() {
        println!("=== PageRank ===");
    } else {
        println!("=== Topic PageRank ({} topic nodes) ===", outcome.topics.len());
    }
    if !outcome.unresolved.is_empty() {
        println!();
        println!("Unresolved topics:");
        for key in &outcome.unresolved {
            println!("  - {:?}", key);
        }
    }
    println!();
    for (rank, node) in outcome.top.iter().enumerate() {
        println!(
            "{:>4}  {:.6e}  {:<16} {:>12}  {}",
            rank + 1,
            node.score,
            node.node_type,
            node.external_id,
            node.name
        );
    }
}
