pub mod card_service;
pub mod date_normalizer;
pub mod list_resolver;

pub use card_service::{AddChecklist, CreateCard, SetCardDesc};
pub use date_normalizer::NormalizeDatetime;
pub use list_resolver::ResolveListId;

use crate::config::BoardDefaults;
use crate::error::ToolError;
use crate::ollama::ToolDef;
use crate::trello::TrelloClient;

/// A callable capability the planner can request by name.
///
/// Object-safe on purpose: the orchestrator dispatches through a registry,
/// so tools take and return plain JSON values and validate their own
/// arguments.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema of the arguments object, advertised to the planner.
    fn parameters(&self) -> serde_json::Value;
    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// Decode a tool's argument object into its typed form.
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(
    args: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(args)
        .map_err(|e| ToolError::Validation(format!("invalid arguments: {}", e)))
}

/// Ordered registry of tools, consulted by name at dispatch time.
pub struct Toolbox {
    tools: Vec<Box<dyn Tool>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Wire-format definitions for the planner, in registration order.
    pub fn definitions(&self) -> Vec<ToolDef> {
        self.tools
            .iter()
            .map(|t| ToolDef::function(t.name(), t.description(), t.parameters()))
            .collect()
    }

    /// Look up a tool by name and invoke it. An unknown name is an
    /// ordinary tool error, observed by the planner like any other.
    pub async fn dispatch(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::Validation(format!("unknown tool '{}'", name)))?;

        tool.invoke(args).await
    }
}

impl Default for Toolbox {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed production toolbox: one date normalizer, one list resolver and
/// the three card mutations.
pub fn standard_toolbox(trello: TrelloClient, defaults: BoardDefaults) -> Toolbox {
    let mut toolbox = Toolbox::new();
    toolbox.register(Box::new(NormalizeDatetime));
    toolbox.register(Box::new(ResolveListId::new(trello.clone(), defaults)));
    toolbox.register(Box::new(CreateCard::new(trello.clone())));
    toolbox.register(Box::new(SetCardDesc::new(trello.clone())));
    toolbox.register(Box::new(AddChecklist::new(trello)));
    toolbox
}
