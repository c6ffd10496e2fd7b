use serde::Deserialize;

use super::{parse_args, Tool};
use crate::error::ToolError;
use crate::trello::TrelloClient;

#[derive(Debug, Deserialize)]
struct CreateCardArgs {
    list_id: String,
    name: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    due: Option<String>,
}

/// Creates a card on a list, optionally with an RFC3339 due date.
pub struct CreateCard {
    trello: TrelloClient,
}

impl CreateCard {
    pub fn new(trello: TrelloClient) -> Self {
        Self { trello }
    }
}

#[async_trait::async_trait]
impl Tool for CreateCard {
    fn name(&self) -> &'static str {
        "trello_create_card"
    }

    fn description(&self) -> &'static str {
        "Cria um card no Trello. Args: list_id, name, desc, due (RFC3339, opcional). Retorna {id, url}."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "list_id": { "type": "string" },
                "name": { "type": "string", "description": "Título do card" },
                "desc": { "type": "string", "description": "Descrição em Markdown" },
                "due": { "type": "string", "description": "Prazo em RFC3339 (omitir se não houver)" }
            },
            "required": ["list_id", "name"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: CreateCardArgs = parse_args(args)?;

        let card = self
            .trello
            .create_card(
                &args.list_id,
                &args.name,
                &args.desc,
                args.due.as_deref().filter(|d| !d.trim().is_empty()),
            )
            .await?;

        Ok(serde_json::json!({ "id": card.id, "url": card.url }))
    }
}

#[derive(Debug, Deserialize)]
struct SetCardDescArgs {
    card_id: String,
    desc: String,
}

/// Replaces the description of an existing card.
pub struct SetCardDesc {
    trello: TrelloClient,
}

impl SetCardDesc {
    pub fn new(trello: TrelloClient) -> Self {
        Self { trello }
    }
}

#[async_trait::async_trait]
impl Tool for SetCardDesc {
    fn name(&self) -> &'static str {
        "trello_set_desc"
    }

    fn description(&self) -> &'static str {
        "Atualiza a descrição de um card existente (substituição completa)."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "card_id": { "type": "string" },
                "desc": { "type": "string", "description": "Nova descrição em Markdown" }
            },
            "required": ["card_id", "desc"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: SetCardDescArgs = parse_args(args)?;
        self.trello.update_card_desc(&args.card_id, &args.desc).await?;
        Ok(serde_json::json!("Descrição atualizada"))
    }
}

#[derive(Debug, Deserialize)]
struct AddChecklistArgs {
    card_id: String,
    checklist_name: String,
    #[serde(default)]
    items: Vec<String>,
}

/// Items that survive trimming, in their original relative order. Blank
/// and whitespace-only entries are dropped without any call being made.
fn retained_items(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect()
}

/// Creates a checklist on a card and appends its items one at a time.
pub struct AddChecklist {
    trello: TrelloClient,
}

impl AddChecklist {
    pub fn new(trello: TrelloClient) -> Self {
        Self { trello }
    }
}

#[async_trait::async_trait]
impl Tool for AddChecklist {
    fn name(&self) -> &'static str {
        "trello_add_checklist"
    }

    fn description(&self) -> &'static str {
        "Cria um checklist no card e adiciona itens, na ordem dada. Itens em branco são ignorados."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "card_id": { "type": "string" },
                "checklist_name": { "type": "string", "description": "Nome do checklist (ex.: 'Tarefas')" },
                "items": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Itens do checklist"
                }
            },
            "required": ["card_id", "checklist_name", "items"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: AddChecklistArgs = parse_args(args)?;

        let checklist_id = self
            .trello
            .create_checklist(&args.card_id, &args.checklist_name)
            .await?;

        // No rollback on partial failure: items added before a failing
        // call stay on the board, and the error names the failed attempt.
        let items = retained_items(&args.items);
        let mut added = 0;
        for (index, item) in items.iter().enumerate() {
            if let Err(source) = self.trello.add_check_item(&checklist_id, item).await {
                return Err(ToolError::ChecklistItem {
                    index: index + 1,
                    item: item.to_string(),
                    added,
                    source: Box::new(source),
                });
            }
            added += 1;
        }

        log::info!(
            "AddChecklist: '{}' created with {} item(s)",
            args.checklist_name,
            added
        );
        Ok(serde_json::json!(format!(
            "Checklist '{}' criado com {} item(ns)",
            args.checklist_name, added
        )))
    }
}
