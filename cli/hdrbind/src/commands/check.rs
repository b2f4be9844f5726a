//! `hdrbind check`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hdrbind_core::{DeclRecord, SkippedDecl};

pub fn run(config_path: &Path, ast: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path, ast)?;
    let front_end = hdrbind_gen::front_end_for(&config)?;
    let analysis = hdrbind_gen::analyze(front_end.as_ref(), &config)
        .with_context(|| format!("analyzing {}", config.source.display()))?;

    let gate = analysis.diagnostics;
    println!("Source: {}", config.source.display());
    println!(
        "Diagnostics: {} note(s), {} warning(s), {} error(s), {} fatal",
        gate.notes, gate.warnings, gate.errors, gate.fatals
    );
    println!("Nodes visited: {}", analysis.visited);

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &analysis.records {
        *counts.entry(record.label()).or_default() += 1;
    }
    println!("Records: {}", analysis.records.len());
    for (label, count) in &counts {
        println!("  {label:<10} {count}");
    }
    let patched = analysis.records.iter().filter_map(DeclRecord::as_aggregate);
    let patched = patched.filter(|a| a.forward).count();
    if patched > 0 {
        println!("  {patched} definition(s) patch an earlier declaration");
    }

    if !analysis.skipped.is_empty() {
        println!("Skipped: {}", analysis.skipped.len());
        for skipped in &analysis.skipped {
            println!("  {}", describe_skip(skipped));
        }
    }

    if analysis.mismatches.is_empty() {
        println!("Layouts: all consistent");
    } else {
        println!("Layout mismatches: {}", analysis.mismatches.len());
        for mismatch in &analysis.mismatches {
            println!("  {mismatch}");
        }
    }
    Ok(())
}

fn describe_skip(skipped: &SkippedDecl) -> String {
    let location = match (&skipped.file, skipped.line) {
        (Some(file), Some(line)) => format!("{file}:{line}: "),
        (Some(file), None) => format!("{file}: "),
        _ => String::new(),
    };
    let kind = skipped.kind.name();
    format!("{location}{kind} '{}': {}", skipped.name, skipped.reason)
}
