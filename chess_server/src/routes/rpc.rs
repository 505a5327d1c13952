//! JSON-RPC dispatch for the A2A endpoint.

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::a2a::{ExecuteParams, MessageParams, TaskResult, TaskState, TaskStatus};
use crate::models::rpc::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::services::push;

use super::AgentRouterState;

type RpcReply = (StatusCode, JsonRpcResponse);

fn reject(id: Value, code: i32, message: &str, details: impl Into<String>) -> RpcReply {
    (
        StatusCode::BAD_REQUEST,
        JsonRpcResponse::failure(id, JsonRpcError::new(code, message).with_details(details)),
    )
}

fn decode<T: DeserializeOwned>(id: &Value, params: Value) -> Result<T, RpcReply> {
    serde_json::from_value(params)
        .map_err(|e| reject(id.clone(), INVALID_PARAMS, "Invalid params", e.to_string()))
}

/// Handle one JSON-RPC request body.
pub async fn handle(state: &AgentRouterState, body: &[u8]) -> RpcReply {
    let raw: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => return reject(Value::Null, PARSE_ERROR, "Parse error", e.to_string()),
    };
    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => return reject(Value::Null, INVALID_REQUEST, "Invalid Request", e.to_string()),
    };

    let id = match (request.jsonrpc.as_deref(), request.id) {
        (Some("2.0"), Some(id)) if !id.is_null() => id,
        (_, id) => {
            return reject(
                id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "Invalid Request",
                "jsonrpc must be '2.0' and id is required",
            )
        }
    };

    let method = request.method.unwrap_or_default();
    let outcome = match method.as_str() {
        "message/send" => {
            crate::metrics::rpc_request("message/send");
            message_send(state, &id, request.params).await
        }
        "execute" => {
            crate::metrics::rpc_request("execute");
            execute(state, &id, request.params).await
        }
        _ => {
            crate::metrics::rpc_request("unknown");
            return reject(
                id,
                METHOD_NOT_FOUND,
                "Method not found",
                format!("unsupported method `{method}`"),
            );
        }
    };

    match outcome {
        Ok(result) => (StatusCode::OK, JsonRpcResponse::success(id, result)),
        Err(reply) => reply,
    }
}

async fn message_send(state: &AgentRouterState, id: &Value, params: Value) -> Result<TaskResult, RpcReply> {
    let MessageParams { message, configuration } = decode(id, params)?;

    if let (false, Some(push_config)) = (configuration.blocking, configuration.push_notification_config) {
        let context_id = message
            .context_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let task_id = message
            .task_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        tracing::info!(context_id = %context_id, task_id = %task_id, url = %push_config.url, "Accepted non-blocking turn");
        let ack = TaskResult::bare(
            task_id.clone(),
            context_id.clone(),
            TaskStatus::new(TaskState::Working, None),
            vec![message.clone()],
        );
        push::spawn_turn(
            state.agent.clone(),
            state.http.clone(),
            push_config,
            id.clone(),
            message,
            context_id,
            task_id,
        );
        return Ok(ack);
    }

    let context_id = message.context_id.clone();
    let task_id = message.task_id.clone();
    run_turn(state, id, vec![message], context_id, task_id).await
}

async fn execute(state: &AgentRouterState, id: &Value, params: Value) -> Result<TaskResult, RpcReply> {
    let ExecuteParams { context_id, task_id, messages } = decode(id, params)?;
    run_turn(state, id, messages, context_id, task_id).await
}

async fn run_turn(
    state: &AgentRouterState,
    id: &Value,
    messages: Vec<crate::models::a2a::A2AMessage>,
    context_id: Option<String>,
    task_id: Option<String>,
) -> Result<TaskResult, RpcReply> {
    state
        .agent
        .process_messages(messages, context_id, task_id)
        .await
        .map_err(|e| {
            crate::metrics::error_recorded(e.kind());
            let status = if e.is_client_error() {
                tracing::info!("Rejected turn: {e}");
                StatusCode::BAD_REQUEST
            } else {
                tracing::error!("Turn failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, JsonRpcResponse::failure(id.clone(), e.to_rpc()))
        })
}
