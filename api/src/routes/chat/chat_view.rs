//! Server-rendered chat page.

use contextor::QaAnswer;
use html_escape::{encode_double_quoted_attribute, encode_text};

pub const DEFAULT_QUESTION: &str = "What is RAG in AI?";

/// Everything one render of the page shows.
#[derive(Debug, Default)]
pub struct PageView {
    pub question: String,
    pub notice: Option<String>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub answer: Option<QaAnswer>,
}

impl PageView {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem;color:#222}\
.notice{background:#e6f4ea;padding:.6rem .8rem;border-radius:6px}\
.warning{background:#fff4e5;padding:.6rem .8rem;border-radius:6px}\
.error{background:#fdecea;padding:.6rem .8rem;border-radius:6px}\
.answer{white-space:pre-wrap}\
input[type=text]{width:100%;padding:.5rem;box-sizing:border-box}\
button{margin-top:.6rem;padding:.5rem 1rem}";

pub fn render_page(view: &PageView) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>RAG Chatbot</title>\n");
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));
    html.push_str("<h1>RAG Chatbot with Hybrid Search</h1>\n");

    if let Some(notice) = &view.notice {
        html.push_str(&format!("<p class=\"notice\">{}</p>\n", encode_text(notice)));
    }
    for warning in &view.warnings {
        html.push_str(&format!("<p class=\"warning\">{}</p>\n", encode_text(warning)));
    }

    html.push_str("<h2>Ask a question about AI concepts</h2>\n");
    html.push_str("<form method=\"post\" action=\"/\">\n");
    html.push_str("<label for=\"question\">Your question:</label>\n");
    html.push_str(&format!(
        "<input type=\"text\" id=\"question\" name=\"question\" value=\"{}\">\n",
        encode_double_quoted_attribute(&view.question)
    ));
    html.push_str("<button type=\"submit\">Get Answer</button>\n</form>\n");

    if let Some(error) = &view.error {
        html.push_str(&format!("<p class=\"error\">{}</p>\n", encode_text(error)));
    }

    if let Some(qa) = &view.answer {
        html.push_str("<h2>Answer</h2>\n");
        html.push_str(&format!(
            "<div class=\"answer\">{}</div>\n",
            encode_text(&qa.answer)
        ));
        html.push_str("<details>\n<summary>Source Documents</summary>\n<ul>\n");
        for doc in &qa.source_documents {
            html.push_str(&format!("<li>{}</li>\n", encode_text(&doc.content)));
        }
        html.push_str("</ul>\n</details>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
