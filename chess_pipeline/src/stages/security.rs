use dagger_sdk::{Directory, Query};

use crate::containers;

/// Audit the agent's resolved dependency tree. No lockfile is committed, so
/// one is generated first.
pub async fn run(client: &Query, source: Directory) -> eyre::Result<String> {
    let output = containers::rust_base(client, source)
        .with_exec(vec!["cargo", "install", "--locked", "cargo-audit"])
        .with_exec(vec!["cargo", "generate-lockfile"])
        .with_exec(vec!["cargo", "audit", "--file", "Cargo.lock"])
        .stdout()
        .await?;

    Ok(format!("[security] chess-agent dependency audit passed.\n{output}"))
}
