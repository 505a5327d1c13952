//! UCI engine client — one short-lived engine process per move.
//!
//! The engine is spawned with piped stdio, given the position and a move
//! time, and read until it prints `bestmove`. Any failure falls back to the
//! first legal move so a turn never stalls on a broken engine install.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Move, Position};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::services::notation;

/// Anything that can pick a reply move for a position.
#[async_trait]
pub trait MoveEngine: Send + Sync {
    /// Engine label for logs.
    fn name(&self) -> &str;

    /// Pick a move, or `None` when the side to move has no legal move.
    async fn best_move(&self, pos: &Chess) -> Option<Move>;
}

#[derive(Debug, Clone)]
pub struct UciEngine {
    path: String,
    args: Vec<String>,
    movetime_ms: u64,
    timeout: Duration,
}

#[derive(Debug, PartialEq)]
enum EngineReply {
    Move(Move),
    NoMove,
}

impl UciEngine {
    pub fn new(path: &str, movetime_ms: u64, timeout: Duration) -> Self {
        Self {
            path: path.to_string(),
            args: Vec::new(),
            movetime_ms,
            timeout,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        let mut engine = Self::new(
            &config.engine_path,
            config.engine_movetime_ms,
            Duration::from_secs(config.engine_timeout_secs),
        );
        engine.args = config.engine_args.clone();
        engine
    }

    /// Extra arguments passed to the engine executable.
    #[cfg(test)]
    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    async fn query(&self, pos: &Chess) -> Result<EngineReply> {
        let fen = notation::fen(pos);

        let mut child = Command::new(&self.path)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AgentError::Engine("engine stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Engine("engine stdout unavailable".to_string()))?;

        let script = format!(
            "uci\nisready\nposition fen {fen}\ngo movetime {}\n",
            self.movetime_ms
        );
        stdin.write_all(script.as_bytes()).await?;
        stdin.flush().await?;

        let mut lines = BufReader::new(stdout).lines();
        let token = tokio::time::timeout(self.timeout, async {
            while let Some(line) = lines.next_line().await? {
                if let Some(rest) = line.strip_prefix("bestmove") {
                    return Ok(Some(rest.split_whitespace().next().unwrap_or("").to_string()));
                }
            }
            Ok::<_, std::io::Error>(None)
        })
        .await
        .map_err(|_| {
            AgentError::Engine(format!("no bestmove within {}s", self.timeout.as_secs_f32()))
        })??;

        // Best effort: let the engine exit on its own, otherwise kill_on_drop reaps it.
        let _ = stdin.write_all(b"quit\n").await;
        drop(stdin);
        let _ = tokio::time::timeout(Duration::from_millis(500), child.wait()).await;

        let token = token.ok_or_else(|| AgentError::Engine("engine exited without bestmove".to_string()))?;
        parse_bestmove(&token, pos)
    }
}

fn parse_bestmove(token: &str, pos: &Chess) -> Result<EngineReply> {
    if token.is_empty() || token == "(none)" || token == "0000" {
        return Ok(EngineReply::NoMove);
    }
    let uci: UciMove = token
        .parse()
        .map_err(|_| AgentError::Engine(format!("unparsable bestmove `{token}`")))?;
    uci.to_move(pos)
        .map(EngineReply::Move)
        .map_err(|_| AgentError::Engine(format!("illegal bestmove `{token}`")))
}

fn first_legal(pos: &Chess) -> Option<Move> {
    pos.legal_moves().first().cloned()
}

#[async_trait]
impl MoveEngine for UciEngine {
    fn name(&self) -> &str {
        &self.path
    }

    async fn best_move(&self, pos: &Chess) -> Option<Move> {
        let start = Instant::now();
        let result = self.query(pos).await;
        crate::metrics::engine_duration(start.elapsed().as_millis() as u64);

        match result {
            Ok(EngineReply::Move(m)) => Some(m),
            Ok(EngineReply::NoMove) => None,
            Err(AgentError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(engine = %self.path, "Engine binary not found, using first legal move");
                crate::metrics::engine_fallback("not_found");
                first_legal(pos)
            }
            Err(e) => {
                tracing::warn!(engine = %self.path, "Engine error, using first legal move: {e}");
                crate::metrics::engine_fallback(match e {
                    AgentError::Io(_) => "io",
                    _ => "protocol",
                });
                first_legal(pos)
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use shakmaty::Square;

    use crate::services::notation::position_from_fen;

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    /// Engine script run through `/bin/sh`, answering `go` with `reply`.
    fn fake_engine(dir: &tempfile::TempDir, reply: &str) -> UciEngine {
        let script = format!(
            r#"while read line; do
  case "$line" in
    uci) echo "id name Fake"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 1 score cp 20"; {reply} ;;
    quit) exit 0 ;;
  esac
done
"#
        );
        let path = dir.path().join("engine.sh");
        std::fs::write(&path, script).unwrap();
        UciEngine::new("/bin/sh", 10, Duration::from_secs(5)).with_args(&[path.to_str().unwrap()])
    }

    #[tokio::test]
    async fn reads_bestmove_from_engine() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(&dir, r#"echo "bestmove e7e5 ponder g1f3""#);
        let m = engine.best_move(&position_from_fen(AFTER_E4)).await.unwrap();
        assert_eq!(m.from(), Some(Square::E7));
        assert_eq!(m.to(), Square::E5);
    }

    #[tokio::test]
    async fn none_means_no_legal_move() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(&dir, r#"echo "bestmove (none)""#);
        assert!(engine.best_move(&position_from_fen(AFTER_E4)).await.is_none());
    }

    #[tokio::test]
    async fn missing_binary_falls_back_to_first_legal() {
        let pos = position_from_fen(AFTER_E4);
        let engine = UciEngine::new("/nonexistent/stockfish", 10, Duration::from_secs(1));
        let expected = pos.legal_moves().first().cloned();
        assert_eq!(engine.best_move(&pos).await, expected);
    }

    #[tokio::test]
    async fn illegal_reply_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(&dir, r#"echo "bestmove e2e4""#);
        let pos = position_from_fen(AFTER_E4);
        let expected = pos.legal_moves().first().cloned();
        assert_eq!(engine.best_move(&pos).await, expected);
    }

    #[tokio::test]
    async fn silent_engine_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = fake_engine(&dir, "sleep 30");
        engine.timeout = Duration::from_millis(300);
        let pos = position_from_fen(AFTER_E4);
        let expected = pos.legal_moves().first().cloned();
        assert_eq!(engine.best_move(&pos).await, expected);
    }

    #[test]
    fn bestmove_tokens() {
        let pos = position_from_fen(AFTER_E4);
        assert_eq!(parse_bestmove("0000", &pos).unwrap(), EngineReply::NoMove);
        assert_eq!(parse_bestmove("", &pos).unwrap(), EngineReply::NoMove);
        assert!(parse_bestmove("zz99", &pos).is_err());
        assert!(matches!(parse_bestmove("g8f6", &pos), Ok(EngineReply::Move(_))));
    }
}
