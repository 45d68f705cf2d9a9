//! End-to-end runs of the `kgrank` binary against a small CSV export.

use std::path::Path;
use std::process::{Command, Output};

const EXPORT: &str = "\
_id,_labels,name,pref_name,_start,_end,_type
1,:Gene,INS,,,,
2,:Gene,GCG,,,,
3,:Disease,type 2 diabetes mellitus,,,,
4,:Compound,,metformin,,,
,,,,1,2,REGULATES_GrG
,,,,2,3,ASSOCIATES_DaG
,,,,3,1,ASSOCIATES_DaG
,,,,3,4,TREATS_CtD
";

fn kgrank(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kgrank"))
        .args(args)
        .env("KGRANK_DATA_DIR", data_dir)
        .env("RUST_LOG", "warn")
        .env_remove("KGRANK_EDGE_TYPES")
        .env_remove("KGRANK_N_ITERS")
        .env_remove("KGRANK_DAMPING")
        .env_remove("KGRANK_TOPIC_PROB")
        .env_remove("KGRANK_PRUNE_UNUSED")
        .env_remove("KGRANK_STRICT")
        .output()
        .unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_summary_json() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("spoke.csv");
    std::fs::write(&source, EXPORT).unwrap();
    let data = dir.path().join("data");

    let out = json(&kgrank(&data, &["summary", source.to_str().unwrap(), "--json"]));
    assert_eq!(out["summary"]["node_count"], 4);
    assert_eq!(out["summary"]["edge_type_counts"]["ASSOCIATES_DaG"], 2);
    assert_eq!(out["load"]["origin"], "ingested");
    assert!(data.join("graph.mtx").is_file());

    let again = json(&kgrank(&data, &["summary", source.to_str().unwrap(), "--json"]));
    assert_eq!(again["load"]["origin"], "cached");
    assert_eq!(again["summary"], out["summary"]);
}

#[test]
fn test_rank_topic_json() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("spoke.csv");
    std::fs::write(&source, EXPORT).unwrap();
    let data = dir.path().join("data");

    let out = json(&kgrank(
        &data,
        &[
            "rank",
            source.to_str().unwrap(),
            "--topic-name",
            "metformin",
            "--topic-id",
            "404",
            "--top",
            "2",
            "--json",
        ],
    ));
    assert_eq!(out["rank"]["topics"], serde_json::json!([3]));
    assert_eq!(out["rank"]["unresolved"], serde_json::json!([{ "id": 404 }]));
    assert_eq!(out["rank"]["top"].as_array().unwrap().len(), 2);
    assert_eq!(out["rank"]["top"][0]["name"], "metformin");
}

#[test]
fn test_bad_usage_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let out = kgrank(dir.path(), &["rank"]);
    assert_eq!(out.status.code(), Some(2));

    let missing = kgrank(dir.path(), &["summary", "nowhere.parquet"]);
    assert!(!missing.status.success());
}
