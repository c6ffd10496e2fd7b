use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHAT_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared HTTP client for Ollama API calls.
pub struct OllamaClient {
    pub endpoint: String,
    pub model: String,
    client: reqwest::Client,
}

/// One message of a chat session, in Ollama's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Name of the tool a `tool`-role message is the observation of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    /// Observation message carrying a tool result back to the model.
    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.into(),
            tool_calls: None,
            tool_name: Some(tool_name.into()),
        }
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_calls: None,
            tool_name: None,
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments arrive as a JSON object keyed by parameter name.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Wire-format description of a callable tool, advertised to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDef,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl ToolDef {
    pub fn function(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            kind: "function",
            function: FunctionDef {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Parameters for a chat request to Ollama.
pub struct ChatRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub tools: &'a [ToolDef],
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl OllamaClient {
    pub fn new(endpoint: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(CHAT_TIMEOUT)
            .build()
            .context("Failed to build Ollama HTTP client")?;

        Ok(Self {
            endpoint,
            model,
            client,
        })
    }

    /// Send a chat request to the Ollama API and return the assistant
    /// message, which may carry tool calls instead of content.
    pub async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatMessage> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "tools": request.tools,
            "stream": false,
            "options": {
                "temperature": request.temperature
            }
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.endpoint))
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error ({}): {}", status, error_text);
        }

        let response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(response.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_message_serializes_name() {
        let msg = ChatMessage::tool("to_rfc3339", "2025-08-07T09:00:00-03:00");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_name"], "to_rfc3339");
    }

    #[test]
    fn test_plain_message_omits_optional_fields() {
        let msg = ChatMessage::user("cria um card");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("tool_calls"));
        assert!(!json.contains("tool_name"));
    }

    #[test]
    fn test_assistant_tool_call_deserializes() {
        let raw = r#"{
            "role": "assistant",
            "content": "",
            "tool_calls": [
                {"function": {"name": "resolve_list_id", "arguments": {"board": "", "list_name": "A fazer"}}}
            ]
        }"#;
        let msg: ChatMessage = serde_json::from_str(raw).unwrap();
        let calls = msg.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "resolve_list_id");
        assert_eq!(calls[0].function.arguments["list_name"], "A fazer");
    }

    #[test]
    fn test_tool_def_shape() {
        let def = ToolDef::function(
            "to_rfc3339",
            "Converte data/hora em RFC3339",
            serde_json::json!({"type": "object", "properties": {}}),
        );
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "to_rfc3339");
    }
}
