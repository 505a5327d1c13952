use dagger_sdk::{Directory, Query};

use crate::containers;

/// Compile the agent server (with its tests) and the pipeline itself.
pub async fn run(client: &Query, source: Directory) -> eyre::Result<String> {
    let output = containers::rust_base(client, source)
        .with_exec(vec![
            "cargo", "check",
            "--package", containers::SERVER_PACKAGE,
            "--package", containers::PIPELINE_PACKAGE,
            "--all-targets",
        ])
        .stdout()
        .await?;

    Ok(format!("[check] chess-agent workspace compiles.\n{output}"))
}
