use thiserror::Error;

/// Errors raised by the deterministic tool layer.
///
/// Tool errors are never fatal to a session: the orchestrator serializes
/// them into the observation fed back to the planner, which may retry with
/// corrected arguments. Only a missing credential pair aborts the run, and
/// that is checked before any session starts.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("trello api error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("trello request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// An "add checklist item" call failed mid-sequence. The `added` items
    /// that preceded it remain on the board; there is no rollback.
    #[error("checklist item {index} ({item:?}) failed after {added} item(s) added: {source}")]
    ChecklistItem {
        index: usize,
        item: String,
        added: usize,
        source: Box<ToolError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_carries_status_and_body() {
        let err = ToolError::Upstream {
            status: 401,
            body: "invalid key".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid key"));
    }

    #[test]
    fn test_checklist_item_display_names_failed_attempt() {
        let err = ToolError::ChecklistItem {
            index: 3,
            item: "Escrever testes".to_string(),
            added: 2,
            source: Box::new(ToolError::Upstream {
                status: 500,
                body: "server error".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("item 3"));
        assert!(msg.contains("Escrever testes"));
        assert!(msg.contains("after 2 item(s)"));
        assert!(msg.contains("500"));
    }
}
