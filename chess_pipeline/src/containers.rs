use dagger_sdk::{Container, Directory, File, Query};

/// Cargo package of the agent service.
pub const SERVER_PACKAGE: &str = "chess-agent-server";

/// Cargo package of this pipeline.
pub const PIPELINE_PACKAGE: &str = "chess-agent-pipeline";

/// Engine location the Debian `stockfish` package installs to.
pub const ENGINE_PATH: &str = "/usr/games/stockfish";

/// Port the agent listens on inside the image.
pub const PORT: &str = "5000";

/// OS packages of the runtime image: the engine plus cairo/pango rendering libraries.
pub const RUNTIME_PACKAGES: &[&str] = &[
    "stockfish",
    "libcairo2",
    "libpango-1.0-0",
    "libpangocairo-1.0-0",
];

/// Rust build container with OpenSSL headers and cargo caches.
pub fn rust_base(client: &Query, source: Directory) -> Container {
    client
        .container()
        .from("rust:1.85-bookworm")
        .with_exec(vec!["apt-get", "update"])
        .with_exec(vec![
            "apt-get", "install", "-y",
            "libssl-dev", "pkg-config", "build-essential",
        ])
        .with_mounted_cache(
            "/usr/local/cargo/registry",
            client.cache_volume("cargo-registry"),
        )
        .with_mounted_cache(
            "/usr/local/cargo/git",
            client.cache_volume("cargo-git"),
        )
        .with_mounted_cache(
            "/app/target",
            client.cache_volume("cargo-target"),
        )
        .with_workdir("/app")
        .with_directory("/app", source)
        .with_env_variable("CARGO_TARGET_DIR", "/app/target")
        .with_env_variable("RUST_BACKTRACE", "1")
}

/// Release build of the agent binary, copied out of the target cache.
pub fn agent_binary(client: &Query, source: Directory) -> File {
    let build = format!(
        "cargo build --release --package {SERVER_PACKAGE} && cp /app/target/release/chess-agent /chess-agent"
    );

    rust_base(client, source)
        .with_exec(vec!["sh", "-c", build.as_str()])
        .file("/chess-agent")
}

/// Runtime image: Debian slim, engine + rendering libraries, agent on port 5000.
pub fn runtime(client: &Query, binary: File) -> Container {
    let install = format!(
        "apt-get install -y --no-install-recommends ca-certificates libssl3 {} && rm -rf /var/lib/apt/lists/*",
        RUNTIME_PACKAGES.join(" ")
    );

    client
        .container()
        .from("debian:bookworm-slim")
        .with_exec(vec!["apt-get", "update"])
        .with_exec(vec!["sh", "-c", install.as_str()])
        .with_workdir("/app")
        .with_file("/app/chess-agent", binary)
        .with_env_variable("PORT", PORT)
        .with_env_variable("CHESS_ENGINE_PATH", ENGINE_PATH)
        .with_env_variable("CHESS_BOARD_DIR", "/tmp/boards")
        .with_exposed_port(5000)
        .with_entrypoint(vec!["/app/chess-agent", "--host", "0.0.0.0", "--port", PORT])
}
