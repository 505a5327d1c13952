use dagger_sdk::{Directory, Query};

use crate::containers;

/// Formatting gate over the agent server and pipeline crates.
pub async fn run(client: &Query, source: Directory) -> eyre::Result<String> {
    let output = containers::rust_base(client, source)
        .with_exec(vec!["rustup", "component", "add", "rustfmt"])
        .with_exec(vec![
            "cargo", "fmt",
            "--package", containers::SERVER_PACKAGE,
            "--package", containers::PIPELINE_PACKAGE,
            "--check",
        ])
        .stdout()
        .await?;

    Ok(format!("[fmt] chess-agent sources formatted.\n{output}"))
}
