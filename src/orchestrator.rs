use anyhow::Result;

use crate::ollama::ChatMessage;
use crate::planner::{Planner, PlannerAction};
use crate::tools::Toolbox;

/// Drives one session: repeatedly asks the planner for the next action,
/// dispatches tool calls, and feeds the observation back, until the
/// planner produces a final answer.
///
/// A pure dispatcher: no retry, no dedupe of repeated calls, no iteration
/// cap, no ordering enforced between tools and no error translation — a
/// tool error becomes an observation like any result, and the planner
/// decides what to do with it. All session state lives in the history
/// owned by `run`, so nothing leaks across sessions.
pub struct Orchestrator {
    planner: Box<dyn Planner>,
    toolbox: Toolbox,
}

impl Orchestrator {
    pub fn new(planner: Box<dyn Planner>, toolbox: Toolbox) -> Self {
        Self { planner, toolbox }
    }

    pub async fn run(&self, mut history: Vec<ChatMessage>) -> Result<String> {
        let tools = self.toolbox.definitions();
        log::debug!(
            "Orchestrator: session starts with tools [{}]",
            tools.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
        );
        let mut step = 0;

        loop {
            step += 1;
            log::info!("Orchestrator: step {} - planning", step);

            match self.planner.plan(&history, &tools).await? {
                PlannerAction::Finish { answer } => {
                    log::info!("Orchestrator: done after {} step(s)", step);
                    return Ok(answer);
                }
                PlannerAction::ToolCall { message, call } => {
                    log::info!("Orchestrator: step {} - dispatching '{}'", step, call.name);

                    let observation = match self
                        .toolbox
                        .dispatch(&call.name, call.arguments.clone())
                        .await
                    {
                        Ok(value) => value.to_string(),
                        Err(e) => {
                            log::warn!("Orchestrator: tool '{}' failed: {}", call.name, e);
                            format!("error: {}", e)
                        }
                    };

                    history.push(message);
                    history.push(ChatMessage::tool(call.name.as_str(), observation));
                }
            }
        }
    }
}
