use serde::Deserialize;

/// Request payload for `POST /api/ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
    /// Optional override of the number of retrieved documents.
    #[serde(default)]
    pub top_k: Option<usize>,
}
