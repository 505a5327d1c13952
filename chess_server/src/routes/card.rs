//! A2A agent card published at `/.well-known/agent.json`.

use serde_json::{json, Value};

use crate::config::AgentConfig;

pub fn agent_card(config: &AgentConfig) -> Value {
    let url = if config.public_url.is_empty() {
        "/a2a/chess".to_string()
    } else {
        format!("{}/a2a/chess", config.public_url)
    };

    json!({
        "name": "Chess Agent",
        "description": "Plays chess against you. Send a move in SAN (e4, Nf3, O-O) or UCI (e2e4); the agent answers with its move and the board.",
        "url": url,
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": {
            "streaming": false,
            "pushNotifications": true,
            "stateTransitionHistory": true
        },
        "defaultInputModes": ["text/plain"],
        "defaultOutputModes": ["text/plain", "image/svg+xml"],
        "skills": [{
            "id": "play_chess",
            "name": "Play chess",
            "description": "One engine reply per user move; each conversation context is one game.",
            "tags": ["chess", "game", "stockfish"],
            "examples": ["e4", "Nf3", "O-O", "e7e8q"]
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_points_at_public_url() {
        let mut config = AgentConfig::for_tests("sf", std::env::temp_dir());
        assert_eq!(agent_card(&config)["url"], "/a2a/chess");
        config.public_url = "https://chess.example.com".to_string();
        assert_eq!(agent_card(&config)["url"], "https://chess.example.com/a2a/chess");
    }
}
