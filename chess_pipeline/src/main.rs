mod containers;
mod stages;

use clap::{Parser, Subcommand};
use dagger_sdk::{Directory, HostDirectoryOpts, Query};

#[derive(Parser)]
#[command(name = "chess-agent-pipeline", about = "Chess Agent CI/CD Pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fast compile check
    Check {
        #[arg(long)]
        source: String,
    },
    /// Format check
    Fmt {
        #[arg(long)]
        source: String,
    },
    /// Clippy lint
    Lint {
        #[arg(long)]
        source: String,
    },
    /// Agent tests
    Test {
        #[arg(long)]
        source: String,
    },
    /// Security audit
    #[command(name = "security-audit")]
    SecurityAudit {
        #[arg(long)]
        source: String,
    },
    /// Build the runtime image (engine + rendering libs + agent)
    Image {
        #[arg(long)]
        source: String,
        /// Registry address to publish to, e.g. ghcr.io/org/chess-agent:latest
        #[arg(long)]
        publish: Option<String>,
    },
    /// Smoke-test the runtime image
    Smoke {
        #[arg(long)]
        source: String,
    },
    /// Full pipeline (check + fmt + lint + test + smoke)
    All {
        #[arg(long)]
        source: String,
    },
}

fn host_directory(client: &Query, source: &str) -> Directory {
    client.host().directory_opts(
        source,
        HostDirectoryOpts {
            exclude: Some(vec!["target/", ".git/", "examples/"]),
            include: None,
            gitignore: None,
            no_cache: None,
        },
    )
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let Cli { command } = Cli::parse();

    dagger_sdk::connect(|client| async move {
        match command {
            Command::Check { source } => {
                let src = host_directory(&client, &source);
                let out = stages::check::run(&client, src).await?;
                println!("{out}");
            }
            Command::Fmt { source } => {
                let src = host_directory(&client, &source);
                let out = stages::fmt::run(&client, src).await?;
                println!("{out}");
            }
            Command::Lint { source } => {
                let src = host_directory(&client, &source);
                let out = stages::lint::run(&client, src).await?;
                println!("{out}");
            }
            Command::Test { source } => {
                let src = host_directory(&client, &source);
                let out = stages::test::run(&client, src).await?;
                println!("{out}");
            }
            Command::SecurityAudit { source } => {
                let src = host_directory(&client, &source);
                let out = stages::security::run(&client, src).await?;
                println!("{out}");
            }
            Command::Image { source, publish } => {
                let src = host_directory(&client, &source);
                let out = stages::image::run(&client, src, publish.as_deref()).await?;
                println!("{out}");
            }
            Command::Smoke { source } => {
                let src = host_directory(&client, &source);
                let out = stages::smoke::run(&client, src).await?;
                println!("{out}");
            }
            Command::All { source } => {
                let src = host_directory(&client, &source);

                println!("=== Phase 1: Fast Gates ===");
                let (check_out, fmt_out) = tokio::try_join!(
                    stages::check::run(&client, src.clone()),
                    stages::fmt::run(&client, src.clone()),
                )?;
                println!("{check_out}\n{fmt_out}");

                println!("=== Phase 2: Quality Gates ===");
                let (lint_out, test_out) = tokio::try_join!(
                    stages::lint::run(&client, src.clone()),
                    stages::test::run(&client, src.clone()),
                )?;
                println!("{lint_out}\n{test_out}");

                println!("=== Phase 3: Runtime Image ===");
                let smoke_out = stages::smoke::run(&client, src).await?;
                println!("{smoke_out}");

                println!("\n=== Full CI Pipeline Complete ===");
            }
        }
        Ok(())
    })
    .await?;

    Ok(())
}
