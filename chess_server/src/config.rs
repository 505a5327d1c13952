//! Agent configuration — loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Path to the UCI engine executable.
    pub engine_path: String,
    /// Extra engine arguments, whitespace separated in `CHESS_ENGINE_ARGS`.
    pub engine_args: Vec<String>,
    /// Think time handed to the engine via `go movetime`.
    pub engine_movetime_ms: u64,
    /// Hard ceiling on one engine conversation before falling back.
    pub engine_timeout_secs: u64,
    /// Directory board images are written to and served from.
    pub board_dir: PathBuf,
    /// Public base URL of this service, used for board links. Empty means `file://` links.
    pub public_url: String,
    /// Minutes of inactivity before a game session is dropped.
    pub session_idle_min: u64,
    /// Per-request timeout for the HTTP layer.
    pub request_timeout_secs: u64,
}

impl AgentConfig {
    pub fn from_env(engine_path: String) -> Self {
        let engine_args = std::env::var("CHESS_ENGINE_ARGS")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let engine_movetime_ms = env_parse("CHESS_ENGINE_MOVETIME_MS", 1000);
        let engine_timeout_secs = env_parse("CHESS_ENGINE_TIMEOUT_SECS", 10);
        let board_dir = std::env::var("CHESS_BOARD_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_board_dir);
        let public_url = std::env::var("CHESS_PUBLIC_URL")
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        let session_idle_min = env_parse("CHESS_SESSION_IDLE_MIN", 60);
        let request_timeout_secs = env_parse("CHESS_REQUEST_TIMEOUT_SECS", 30);

        if !std::path::Path::new(&engine_path).exists() {
            tracing::warn!(
                engine = %engine_path,
                "Engine binary not found -- replies will fall back to the first legal move"
            );
        }
        if public_url.is_empty() {
            tracing::debug!("CHESS_PUBLIC_URL not set -- board artifacts use file:// URLs");
        }

        Self {
            engine_path,
            engine_args,
            engine_movetime_ms,
            engine_timeout_secs,
            board_dir,
            public_url,
            session_idle_min,
            request_timeout_secs,
        }
    }

    /// Idle time after which a game is swept.
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_min.saturating_mul(60))
    }
}

/// Private subdirectory of the OS temp dir, never the temp dir itself.
fn default_board_dir() -> PathBuf {
    std::env::temp_dir().join("chess-boards")
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
impl AgentConfig {
    /// Config pointing at a board directory, no env lookups.
    pub fn for_tests(engine_path: &str, board_dir: PathBuf) -> Self {
        Self {
            engine_path: engine_path.to_string(),
            engine_args: Vec::new(),
            engine_movetime_ms: 50,
            engine_timeout_secs: 5,
            board_dir,
            public_url: String::new(),
            session_idle_min: 60,
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_on_garbage() {
        std::env::set_var("CHESS_TEST_GARBAGE_NUMBER", "not-a-number");
        assert_eq!(env_parse("CHESS_TEST_GARBAGE_NUMBER", 42u64), 42);
        std::env::set_var("CHESS_TEST_GOOD_NUMBER", "7");
        assert_eq!(env_parse("CHESS_TEST_GOOD_NUMBER", 42u64), 7);
        assert_eq!(env_parse("CHESS_TEST_UNSET_NUMBER", 3u64), 3);
    }

    #[test]
    fn session_idle_saturates_on_huge_minutes() {
        let mut config = AgentConfig::for_tests("/bin/true", PathBuf::from("/tmp"));
        assert_eq!(config.session_idle(), Duration::from_secs(3600));
        config.session_idle_min = u64::MAX;
        assert_eq!(config.session_idle(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn default_board_dir_is_a_subdirectory_of_temp() {
        let dir = default_board_dir();
        assert_ne!(dir, std::env::temp_dir());
        assert!(dir.starts_with(std::env::temp_dir()));
        assert!(dir.ends_with("chess-boards"));
    }
}
