//! A2A message, task and artifact types as they appear on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Text,
    Data,
    File,
}

/// One piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePart {
    pub kind: PartKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: PartKind::Text,
            text: Some(text.into()),
            data: None,
            file_url: None,
        }
    }

    pub fn file(url: impl Into<String>) -> Self {
        Self {
            kind: PartKind::File,
            text: None,
            data: None,
            file_url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    System,
}

fn message_kind() -> String {
    "message".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2AMessage {
    #[serde(default = "message_kind")]
    pub kind: String,
    pub role: Role,
    pub parts: Vec<MessagePart>,
    #[serde(default = "new_id")]
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl A2AMessage {
    pub fn new(role: Role, parts: Vec<MessagePart>) -> Self {
        Self {
            kind: message_kind(),
            role,
            parts,
            message_id: new_id(),
            task_id: None,
            context_id: None,
            metadata: None,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Text of the first `text` part, trimmed. Empty when there is none.
    pub fn first_text(&self) -> &str {
        self.parts
            .iter()
            .find(|p| p.kind == PartKind::Text)
            .and_then(|p| p.text.as_deref())
            .map(str::trim)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushNotificationConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Value>,
}

fn default_blocking() -> bool {
    true
}

fn default_output_modes() -> Vec<String> {
    vec!["text/plain".to_string(), "image/svg+xml".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageConfiguration {
    #[serde(default = "default_blocking")]
    pub blocking: bool,
    #[serde(default = "default_output_modes")]
    pub accepted_output_modes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notification_config: Option<PushNotificationConfig>,
}

impl Default for MessageConfiguration {
    fn default() -> Self {
        Self {
            blocking: default_blocking(),
            accepted_output_modes: default_output_modes(),
            push_notification_config: None,
        }
    }
}

/// Params of `message/send`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageParams {
    pub message: A2AMessage,
    #[serde(default)]
    pub configuration: MessageConfiguration,
}

/// Params of `execute`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteParams {
    #[serde(default)]
    pub context_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    pub messages: Vec<A2AMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Working,
    Completed,
    InputRequired,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<A2AMessage>,
}

impl TaskStatus {
    pub fn new(state: TaskState, message: Option<A2AMessage>) -> Self {
        Self {
            state,
            timestamp: chrono::Utc::now().to_rfc3339(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default = "new_id")]
    pub artifact_id: String,
    pub name: String,
    pub parts: Vec<MessagePart>,
}

impl Artifact {
    pub fn new(name: &str, parts: Vec<MessagePart>) -> Self {
        Self {
            artifact_id: new_id(),
            name: name.to_string(),
            parts,
        }
    }
}

fn task_kind() -> String {
    "task".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub history: Vec<A2AMessage>,
    #[serde(default = "task_kind")]
    pub kind: String,
}

impl TaskResult {
    /// A task with no artifacts, used for `working` acks and `failed` pushes.
    pub fn bare(id: String, context_id: String, status: TaskStatus, history: Vec<A2AMessage>) -> Self {
        Self {
            id,
            context_id,
            status,
            artifacts: Vec::new(),
            history,
            kind: task_kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_defaults_fill_in() {
        let msg: A2AMessage = serde_json::from_value(json!({
            "role": "user",
            "parts": [{"kind": "text", "text": "  e4 "}]
        }))
        .unwrap();
        assert_eq!(msg.kind, "message");
        assert!(!msg.message_id.is_empty());
        assert_eq!(msg.first_text(), "e4");
    }

    #[test]
    fn first_text_skips_non_text_parts() {
        let msg = A2AMessage::new(
            Role::User,
            vec![
                MessagePart::file("file:///tmp/x.svg"),
                MessagePart::text("Nf3"),
                MessagePart::text("ignored"),
            ],
        );
        assert_eq!(msg.first_text(), "Nf3");
        assert_eq!(A2AMessage::new(Role::User, vec![]).first_text(), "");
    }

    #[test]
    fn task_state_uses_kebab_case() {
        assert_eq!(
            serde_json::to_value(TaskState::InputRequired).unwrap(),
            json!("input-required")
        );
    }

    #[test]
    fn task_result_serializes_camel_case() {
        let msg = A2AMessage::new(Role::Agent, vec![MessagePart::text("I played e5")]).with_task_id("t1");
        let result = TaskResult {
            id: "t1".into(),
            context_id: "c1".into(),
            status: TaskStatus::new(TaskState::InputRequired, Some(msg)),
            artifacts: vec![Artifact::new("board", vec![MessagePart::file("file:///tmp/b.svg")])],
            history: vec![],
            kind: task_kind(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["contextId"], "c1");
        assert_eq!(value["kind"], "task");
        assert_eq!(value["status"]["message"]["taskId"], "t1");
        assert_eq!(value["artifacts"][0]["parts"][0]["file_url"], "file:///tmp/b.svg");
        assert!(value["artifacts"][0]["parts"][0].get("text").is_none());
    }

    #[test]
    fn configuration_defaults_to_blocking() {
        let params: MessageParams = serde_json::from_value(json!({
            "message": {"role": "user", "parts": []}
        }))
        .unwrap();
        assert!(params.configuration.blocking);
        assert!(params.configuration.push_notification_config.is_none());
    }
}
