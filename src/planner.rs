use anyhow::Result;

use crate::ollama::{ChatMessage, ChatRequest, FunctionCall, OllamaClient, ToolDef};

/// What the planner decided to do with the session so far.
#[derive(Debug)]
pub enum PlannerAction {
    /// Invoke one tool. Carries the verbatim assistant message so the
    /// orchestrator can append it to the history before the observation.
    ToolCall {
        message: ChatMessage,
        call: FunctionCall,
    },
    /// Terminal answer; the session ends here.
    Finish { answer: String },
}

/// Opaque decision-maker driving a session.
///
/// Given the history and the toolbox, it returns either one tool-call
/// request or a final answer. A planner transport failure is fatal to the
/// session: unlike a tool error, it cannot be fed back to the planner as
/// an observation.
#[async_trait::async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, history: &[ChatMessage], tools: &[ToolDef]) -> Result<PlannerAction>;
}

/// Planner backed by an Ollama-hosted model with native tool calling.
pub struct OllamaPlanner {
    client: OllamaClient,
    temperature: f32,
}

impl OllamaPlanner {
    pub fn new(client: OllamaClient, temperature: f32) -> Self {
        Self {
            client,
            temperature,
        }
    }
}

#[async_trait::async_trait]
impl Planner for OllamaPlanner {
    async fn plan(&self, history: &[ChatMessage], tools: &[ToolDef]) -> Result<PlannerAction> {
        let message = self
            .client
            .chat(ChatRequest {
                messages: history,
                tools,
                temperature: self.temperature,
            })
            .await?;

        let calls = message.tool_calls.clone().unwrap_or_default();
        match calls.first() {
            Some(first) => {
                if calls.len() > 1 {
                    // One call per turn; the model re-plans after each
                    // observation, so extras are dropped rather than queued.
                    log::warn!(
                        "OllamaPlanner: model requested {} tool calls, keeping only the first",
                        calls.len()
                    );
                }
                Ok(PlannerAction::ToolCall {
                    call: first.function.clone(),
                    message,
                })
            }
            None => Ok(PlannerAction::Finish {
                answer: message.content,
            }),
        }
    }
}
