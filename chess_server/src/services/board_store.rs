//! In-memory game sessions keyed by A2A context id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shakmaty::Chess;
use tokio::sync::{Mutex, RwLock};

/// One game. Lock it for the whole turn so moves on a context never interleave.
#[derive(Debug)]
pub struct GameSession {
    pub position: Chess,
    last_active: Instant,
}

impl GameSession {
    fn new() -> Self {
        Self {
            position: Chess::default(),
            last_active: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }
}

#[derive(Debug, Default)]
pub struct BoardStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<GameSession>>>>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `context_id`, created from the start position if absent.
    ///
    /// The session is marked active while the map lock is still held, so a
    /// sweep cannot evict it between lookup and the caller's turn. A session
    /// already locked is mid-turn and is skipped by the sweep anyway.
    pub async fn session(&self, context_id: &str) -> Arc<Mutex<GameSession>> {
        if let Some(session) = self.sessions.read().await.get(context_id) {
            if let Ok(mut game) = session.try_lock() {
                game.touch();
            }
            return session.clone();
        }
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(context_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(GameSession::new())))
            .clone();
        crate::metrics::active_sessions(sessions.len());
        session
    }

    /// Current position of a context, if a game exists.
    pub async fn position(&self, context_id: &str) -> Option<Chess> {
        let session = self.sessions.read().await.get(context_id).cloned()?;
        let guard = session.lock().await;
        Some(guard.position.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn clear(&self) {
        self.sessions.write().await.clear();
        crate::metrics::active_sessions(0);
    }

    /// Drop sessions idle longer than `max_idle`. Sessions mid-turn are kept.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.idle_for() <= max_idle,
            Err(_) => true,
        });
        crate::metrics::active_sessions(sessions.len());
        before - sessions.len()
    }
}

/// Periodically evict idle sessions. Spawned as a background tokio task.
pub fn spawn_sweeper(store: Arc<BoardStore>, max_idle: Duration) -> tokio::task::JoinHandle<()> {
    let period = max_idle.min(Duration::from_secs(60)).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let evicted = store.sweep_idle(max_idle).await;
            if evicted > 0 {
                tracing::info!(evicted, "Evicted idle game sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Position;

    #[tokio::test]
    async fn session_is_created_once() {
        let store = BoardStore::new();
        let a = store.session("ctx").await;
        let b = store.session("ctx").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len().await, 1);
        assert_eq!(store.position("ctx").await.unwrap().fullmoves().get(), 1);
        assert!(store.position("other").await.is_none());
    }

    #[tokio::test]
    async fn sweep_drops_only_idle_sessions() {
        let store = BoardStore::new();
        store.session("old").await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.session("fresh").await;

        let evicted = store.sweep_idle(Duration::from_millis(25)).await;
        assert_eq!(evicted, 1);
        assert!(store.position("old").await.is_none());
        assert!(store.position("fresh").await.is_some());
    }

    #[tokio::test]
    async fn lookup_refreshes_idle_session() {
        let store = BoardStore::new();
        let first = store.session("ctx").await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Looked up but not yet locked by the caller.
        let second = store.session("ctx").await;
        assert_eq!(store.sweep_idle(Duration::from_millis(25)).await, 0);

        let third = store.session("ctx").await;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[tokio::test]
    async fn sweep_keeps_locked_sessions() {
        let store = BoardStore::new();
        let session = store.session("busy").await;
        let _guard = session.lock().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.sweep_idle(Duration::ZERO).await, 0);
    }

    #[tokio::test]
    async fn clear_empties_store() {
        let store = BoardStore::new();
        store.session("a").await;
        store.session("b").await;
        store.clear().await;
        assert_eq!(store.len().await, 0);
    }
}
