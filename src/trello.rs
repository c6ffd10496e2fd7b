use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

use crate::config::Credentials;
use crate::error::ToolError;

const TRELLO_API: &str = "https://api.trello.com/1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static BOARD_SHORT_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/b/([A-Za-z0-9]+)/").expect("valid board short-link regex"));

/// A list on a board, as returned by the Trello API.
#[derive(Debug, Clone, Deserialize)]
pub struct TrelloList {
    pub id: String,
    pub name: String,
}

/// The two fields of a freshly created card that the planner cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCard {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct CreatedChecklist {
    id: String,
}

/// Extract the board short link from a shareable URL
/// (`https://trello.com/b/<short>/<name>`). A bare short link passes
/// through unchanged.
pub fn board_short_link(board_ref: &str) -> &str {
    match BOARD_SHORT_LINK_RE.captures(board_ref) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(board_ref),
        None => board_ref,
    }
}

/// Shared HTTP client for the Trello REST API.
///
/// Every call is a single blocking request with a fixed timeout and no
/// retry; the key/token pair is appended as query parameters.
#[derive(Clone)]
pub struct TrelloClient {
    key: String,
    token: String,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(credentials: Credentials) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            key: credentials.key,
            token: credentials.token,
            client,
        })
    }

    fn auth(&self) -> [(&'static str, &str); 2] {
        [("key", &self.key), ("token", &self.token)]
    }

    /// Turn a non-success response into an Upstream error carrying the
    /// status and response body.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ToolError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ToolError::Upstream {
            status: status.as_u16(),
            body,
        })
    }

    /// Fetch all lists of a board. Accepts a board URL or a bare short
    /// link; lists come back in the board's own order.
    pub async fn board_lists(&self, board_ref: &str) -> Result<Vec<TrelloList>, ToolError> {
        let short = board_short_link(board_ref);
        log::info!("TrelloClient: fetching lists of board {}", short);

        let response = self
            .client
            .get(format!("{}/boards/{}/lists", TRELLO_API, short))
            .query(&[("fields", "name,id")])
            .query(&self.auth())
            .send()
            .await?;

        let lists: Vec<TrelloList> = Self::check(response).await?.json().await?;
        log::info!("TrelloClient: board {} has {} list(s)", short, lists.len());
        Ok(lists)
    }

    /// Create a card on a list. When `due` is absent the parameter is left
    /// out of the request entirely, so the card is created without a due
    /// date rather than with a null one.
    pub async fn create_card(
        &self,
        list_id: &str,
        name: &str,
        desc: &str,
        due: Option<&str>,
    ) -> Result<CreatedCard, ToolError> {
        log::info!("TrelloClient: creating card {:?} on list {}", name, list_id);

        let mut params: Vec<(&str, &str)> =
            vec![("idList", list_id), ("name", name), ("desc", desc)];
        if let Some(due) = due {
            params.push(("due", due));
        }

        let response = self
            .client
            .post(format!("{}/cards", TRELLO_API))
            .query(&params)
            .query(&self.auth())
            .send()
            .await?;

        let card: CreatedCard = Self::check(response).await?.json().await?;
        log::info!("TrelloClient: card created at {}", card.url);
        Ok(card)
    }

    /// Replace a card's description (full replace, not a merge).
    pub async fn update_card_desc(&self, card_id: &str, desc: &str) -> Result<(), ToolError> {
        log::info!("TrelloClient: updating description of card {}", card_id);

        let response = self
            .client
            .put(format!("{}/cards/{}", TRELLO_API, card_id))
            .query(&[("desc", desc)])
            .query(&self.auth())
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Create an empty checklist under a card, returning its id.
    pub async fn create_checklist(
        &self,
        card_id: &str,
        name: &str,
    ) -> Result<String, ToolError> {
        log::info!("TrelloClient: creating checklist {:?} on card {}", name, card_id);

        let response = self
            .client
            .post(format!("{}/checklists", TRELLO_API))
            .query(&[("idCard", card_id), ("name", name)])
            .query(&self.auth())
            .send()
            .await?;

        let checklist: CreatedChecklist = Self::check(response).await?.json().await?;
        Ok(checklist.id)
    }

    /// Append one item to a checklist.
    pub async fn add_check_item(&self, checklist_id: &str, name: &str) -> Result<(), ToolError> {
        let response = self
            .client
            .post(format!("{}/checklists/{}/checkItems", TRELLO_API, checklist_id))
            .query(&[("name", name)])
            .query(&self.auth())
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_short_link_from_url() {
        assert_eq!(
            board_short_link("https://trello.com/b/S33WAXxl/nocapital"),
            "S33WAXxl"
        );
    }

    #[test]
    fn test_board_short_link_passthrough() {
        assert_eq!(board_short_link("S33WAXxl"), "S33WAXxl");
    }

    #[test]
    fn test_board_short_link_requires_trailing_segment() {
        // Without a segment after the short link the URL form is not
        // recognized and the input is returned as-is.
        assert_eq!(
            board_short_link("https://trello.com/b/S33WAXxl"),
            "https://trello.com/b/S33WAXxl"
        );
    }
}
