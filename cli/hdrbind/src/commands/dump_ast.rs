//! `hdrbind dump-ast`

use std::path::Path;

use anyhow::{Context, Result};
use hdrbind_ast::{ClangFrontEnd, FrontEnd};

pub fn run(header: &Path, args: &[String], output: Option<&Path>) -> Result<()> {
    let unit = ClangFrontEnd::new()
        .parse(header, args)
        .with_context(|| format!("parsing {}", header.display()))?;
    let json = unit.to_json().context("serializing declaration tree")?;

    match output {
        Some(path) => {
            hdrbind_gen::write_artifact(path, &json)
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "Dumped {} node(s), {} diagnostic(s) → {}",
                unit.root.subtree_len(),
                unit.diagnostics.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
