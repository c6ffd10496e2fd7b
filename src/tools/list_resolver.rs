use serde::Deserialize;

use super::{parse_args, Tool};
use crate::config::BoardDefaults;
use crate::error::ToolError;
use crate::trello::{TrelloClient, TrelloList};

/// Two-pass match over a board's lists, first hit wins in API return
/// order: exact case-insensitive equality first, then substring
/// containment. The substring pass tolerates minor naming drift ("To Do"
/// vs "to-do list") while the exact pass keeps precision when the real
/// name is given.
pub fn find_list<'a>(lists: &'a [TrelloList], wanted: &str) -> Option<&'a TrelloList> {
    let wanted = wanted.trim().to_lowercase();

    lists
        .iter()
        .find(|l| l.name.trim().to_lowercase() == wanted)
        .or_else(|| {
            lists
                .iter()
                .find(|l| l.name.trim().to_lowercase().contains(&wanted))
        })
}

fn pick(value: Option<String>, fallback: &Option<String>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.clone())
        .filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct Args {
    #[serde(default)]
    board: Option<String>,
    #[serde(default)]
    list_name: Option<String>,
}

/// Maps a (board, list name) pair to the list's stable id.
pub struct ResolveListId {
    trello: TrelloClient,
    defaults: BoardDefaults,
}

impl ResolveListId {
    pub fn new(trello: TrelloClient, defaults: BoardDefaults) -> Self {
        Self { trello, defaults }
    }
}

#[async_trait::async_trait]
impl Tool for ResolveListId {
    fn name(&self) -> &'static str {
        "resolve_list_id"
    }

    fn description(&self) -> &'static str {
        "Retorna o idList a partir de (board, list_name). 'board' pode ser a URL do board ou o shortlink; valores vazios usam os padrões configurados."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "board": {
                    "type": "string",
                    "description": "URL ou shortlink do board (vazio = padrão)"
                },
                "list_name": {
                    "type": "string",
                    "description": "Nome da lista (vazio = padrão)"
                }
            }
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: Args = parse_args(args)?;

        let board = pick(args.board, &self.defaults.board).ok_or_else(|| {
            ToolError::Configuration(
                "no board given and no default board configured".to_string(),
            )
        })?;
        let list_name = pick(args.list_name, &self.defaults.list).ok_or_else(|| {
            ToolError::Configuration(
                "no list name given and no default list configured".to_string(),
            )
        })?;

        let lists = self.trello.board_lists(&board).await?;
        let list = find_list(&lists, &list_name).ok_or_else(|| {
            ToolError::NotFound(format!("list '{}' not found on board {}", list_name, board))
        })?;

        log::info!("ResolveListId: '{}' -> {}", list_name, list.id);
        Ok(serde_json::json!(list.id))
    }
}
