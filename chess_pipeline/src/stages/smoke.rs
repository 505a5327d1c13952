use dagger_sdk::{Directory, Query};

use crate::containers;

/// Verify the built runtime image: packages installed, env defaults, engine and agent runnable.
pub async fn run(client: &Query, source: Directory) -> eyre::Result<String> {
    let binary = containers::agent_binary(client, source);

    let script = format!(
        r#"
set -eu

echo "=== Runtime Image Smoke Test ==="

echo "[1/5] Checking OS packages..."
for pkg in {packages}; do
    dpkg -s "$pkg" >/dev/null 2>&1 || {{ echo "ERROR: package $pkg not installed"; exit 1; }}
done

echo "[2/5] Checking environment defaults..."
[ "$PORT" = "{port}" ] || {{ echo "ERROR: PORT=$PORT, expected {port}"; exit 1; }}
[ "$CHESS_ENGINE_PATH" = "{engine}" ] || {{ echo "ERROR: CHESS_ENGINE_PATH=$CHESS_ENGINE_PATH"; exit 1; }}

echo "[3/5] Checking engine binary..."
test -x "$CHESS_ENGINE_PATH" || {{ echo "ERROR: $CHESS_ENGINE_PATH not executable"; exit 1; }}

echo "[4/5] Checking engine speaks UCI..."
printf 'uci\nquit\n' | "$CHESS_ENGINE_PATH" | grep -q uciok

echo "[5/5] Checking agent binary..."
/app/chess-agent --help >/dev/null

echo "=== Smoke Test Complete ==="
"#,
        packages = containers::RUNTIME_PACKAGES.join(" "),
        port = containers::PORT,
        engine = containers::ENGINE_PATH,
    );

    let output = containers::runtime(client, binary)
        .with_exec(vec!["sh", "-c", script.as_str()])
        .stdout()
        .await?;

    Ok(format!("[smoke] {output}"))
}
