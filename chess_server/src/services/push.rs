//! A2A push notifications — deliver a finished task to the client's webhook.

use std::sync::Arc;

use serde_json::Value;

use crate::models::a2a::{
    A2AMessage, MessagePart, PushNotificationConfig, Role, TaskResult, TaskState, TaskStatus,
};
use crate::models::rpc::JsonRpcResponse;
use crate::services::agent::ChessAgent;

/// POST a JSON-RPC response carrying `result` to the push URL.
pub async fn deliver(
    client: &reqwest::Client,
    config: &PushNotificationConfig,
    request_id: Value,
    result: TaskResult,
) -> anyhow::Result<()> {
    let body = JsonRpcResponse::success(request_id, result);

    let mut req = client
        .post(&config.url)
        .header("User-Agent", "chess-agent")
        .json(&body);
    if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
        req = req.header("Authorization", format!("Bearer {token}"));
    }

    let resp = req.send().await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("push endpoint returned {status}: {text}");
    }

    Ok(())
}

/// Run a turn in the background and push its outcome. Failed turns are pushed as `failed` tasks.
pub fn spawn_turn(
    agent: Arc<ChessAgent>,
    client: reqwest::Client,
    config: PushNotificationConfig,
    request_id: Value,
    message: A2AMessage,
    context_id: String,
    task_id: String,
) {
    tokio::spawn(async move {
        let result = match agent
            .process_messages(vec![message.clone()], Some(context_id.clone()), Some(task_id.clone()))
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(context_id = %context_id, task_id = %task_id, "Background turn failed: {e}");
                crate::metrics::error_recorded(e.kind());
                let reply = A2AMessage::new(Role::Agent, vec![MessagePart::text(e.to_string())])
                    .with_task_id(&task_id);
                TaskResult::bare(
                    task_id.clone(),
                    context_id.clone(),
                    TaskStatus::new(TaskState::Failed, Some(reply.clone())),
                    vec![message, reply],
                )
            }
        };

        if let Err(e) = deliver(&client, &config, request_id, result).await {
            tracing::warn!(url = %config.url, task_id = %task_id, "Push notification failed: {e}");
            crate::metrics::error_recorded("push");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::sync::mpsc;

    type Received = (Option<String>, Value);

    async fn receiver() -> (String, mpsc::UnboundedReceiver<Received>) {
        let (tx, rx) = mpsc::unbounded_channel::<Received>();
        let app = Router::new()
            .route(
                "/push",
                post(
                    |State(tx): State<mpsc::UnboundedSender<Received>>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        let _ = tx.send((auth, body));
                    },
                ),
            )
            .with_state(tx);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}/push"), rx)
    }

    fn push_config(url: String, token: Option<&str>) -> PushNotificationConfig {
        PushNotificationConfig {
            url,
            token: token.map(str::to_string),
            authentication: None,
        }
    }

    #[tokio::test]
    async fn background_turn_pushes_result_with_token() {
        let (url, mut rx) = receiver().await;
        let dir = tempfile::tempdir().unwrap();
        let agent = Arc::new(crate::services::agent::tests::agent(&dir, Some(0)));

        spawn_turn(
            agent,
            reqwest::Client::new(),
            push_config(url, Some("secret")),
            Value::from("req-9"),
            A2AMessage::new(Role::User, vec![MessagePart::text("e4")]),
            "ctx".to_string(),
            "task".to_string(),
        );

        let (auth, body) = rx.recv().await.unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer secret"));
        assert_eq!(body["id"], "req-9");
        assert_eq!(body["result"]["id"], "task");
        assert_eq!(body["result"]["status"]["state"], "input-required");
    }

    #[tokio::test]
    async fn failed_turn_pushes_failed_task() {
        let (url, mut rx) = receiver().await;
        let dir = tempfile::tempdir().unwrap();
        let agent = Arc::new(crate::services::agent::tests::agent(&dir, Some(0)));

        spawn_turn(
            agent,
            reqwest::Client::new(),
            push_config(url, None),
            Value::from(1),
            A2AMessage::new(Role::User, vec![MessagePart::text("Kz9")]),
            "ctx".to_string(),
            "task".to_string(),
        );

        let (auth, body) = rx.recv().await.unwrap();
        assert!(auth.is_none());
        assert_eq!(body["result"]["status"]["state"], "failed");
        assert_eq!(
            body["result"]["status"]["message"]["parts"][0]["text"],
            "Invalid move: Kz9"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let config = push_config("http://127.0.0.1:9/push".to_string(), None);
        let result = TaskResult::bare(
            "t".into(),
            "c".into(),
            TaskStatus::new(TaskState::Working, None),
            vec![],
        );
        assert!(deliver(&reqwest::Client::new(), &config, Value::Null, result).await.is_err());
    }
}
