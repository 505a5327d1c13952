//! ChessAgent — plays one engine reply per incoming user move.
//!
//! Each A2A context owns one game. A turn parses the user's move from the
//! last message, asks the engine for a reply, renders the board and returns
//! the A2A task describing the exchange.

use std::sync::Arc;

use shakmaty::Position;

use crate::error::{AgentError, Result};
use crate::models::a2a::{
    A2AMessage, Artifact, MessagePart, Role, TaskResult, TaskState, TaskStatus,
};
use crate::services::artifact_service::BoardImages;
use crate::services::board_store::BoardStore;
use crate::services::engine::MoveEngine;
use crate::services::{notation, render};

pub const NO_LEGAL_MOVES: &str = "No legal moves available";

pub struct ChessAgent {
    engine: Arc<dyn MoveEngine>,
    boards: Arc<BoardStore>,
    images: BoardImages,
}

impl ChessAgent {
    pub fn new(engine: Arc<dyn MoveEngine>, images: BoardImages) -> Self {
        Self {
            engine,
            boards: Arc::new(BoardStore::new()),
            images,
        }
    }

    pub fn boards(&self) -> &Arc<BoardStore> {
        &self.boards
    }

    /// Play the user's move from the last message and answer with the engine's move.
    pub async fn process_messages(
        &self,
        messages: Vec<A2AMessage>,
        context_id: Option<String>,
        task_id: Option<String>,
    ) -> Result<TaskResult> {
        let context_id = context_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let task_id = task_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let user_message = messages.last().ok_or(AgentError::NoMessage)?;
        let move_text = user_message.first_text().to_string();

        let session = self.boards.session(&context_id).await;
        let mut game = session.lock().await;
        game.touch();

        // Work on a copy so a rejected move leaves the stored game untouched.
        let mut pos = game.position.clone();
        let user_move = notation::parse_user_move(&move_text, &pos)
            .map_err(|_| AgentError::InvalidMove(move_text.clone()))?;
        let user_san = notation::play_with_san(&mut pos, &user_move);
        crate::metrics::move_played("user");

        let mut last_move = Some(user_move);
        let ai_move_san = match self.engine.best_move(&pos).await {
            Some(m) => {
                let san = notation::play_with_san(&mut pos, &m);
                last_move = Some(m);
                crate::metrics::move_played("engine");
                san
            }
            None => NO_LEGAL_MOVES.to_string(),
        };

        game.position = pos.clone();
        drop(game);

        let svg = render::board_svg(&pos, last_move.as_ref());
        let board_url = self.images.save_board(&svg, &context_id, &task_id).await;

        let mut response_text = format!("I played {ai_move_san}");
        if pos.is_checkmate() {
            response_text.push_str(" - Checkmate!");
        } else if pos.is_check() {
            response_text.push_str(" - Check!");
        }

        let response_message =
            A2AMessage::new(Role::Agent, vec![MessagePart::text(response_text)]).with_task_id(&task_id);

        let artifacts = vec![
            Artifact::new("move", vec![MessagePart::text(ai_move_san.clone())]),
            Artifact::new("board", vec![MessagePart::file(board_url)]),
        ];

        let state = if pos.is_game_over() {
            crate::metrics::game_finished();
            TaskState::Completed
        } else {
            TaskState::InputRequired
        };

        tracing::info!(
            context_id = %context_id,
            task_id = %task_id,
            engine = %self.engine.name(),
            user_move = %user_san,
            ai_move = %ai_move_san,
            state = ?state,
            "Turn played"
        );

        let mut history = messages;
        history.push(response_message.clone());

        Ok(TaskResult {
            id: task_id,
            context_id,
            status: TaskStatus::new(state, Some(response_message)),
            artifacts,
            history,
            kind: "task".to_string(),
        })
    }

    /// Drop every game.
    pub async fn cleanup(&self) {
        self.boards.clear().await;
    }
}
