//! Tracing subscriber setup shared by the binary.
//!
//! Compact single-line events with RFC3339 UTC timestamps, filtered by
//! `RUST_LOG` with a fallback default that raises the workspace crates to a
//! chosen level.

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Library targets of this workspace.
pub const WORKSPACE_TARGETS: &[&str] = &[
    "hybrid_rag_chat",
    "ai_llm_service",
    "rag_store",
    "contextor",
    "api",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Formatting layer for the whole process.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with target
/// - Span close events (durations of instrumented functions)
/// - ANSI colors only when stdout is a terminal
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .compact()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
}

/// Level directive for one target, e.g. `rag_store=debug`.
pub fn level_directive(target: &str, level: Level) -> Option<Directive> {
    let s = format!("{target}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).ok()
}

/// `RUST_LOG` if set; otherwise `default` globally plus `level` for the
/// workspace crates.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    WORKSPACE_TARGETS
        .iter()
        .filter_map(|t| level_directive(t, level))
        .fold(EnvFilter::new(default), |f, d| f.add_directive(d))
}
