use serde::Deserialize;

/// Form body of `POST /`.
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub question: String,
}
