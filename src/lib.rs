//! Shared library for the Baubles LTS automation toolkit.
//!
//! Each binary under `src/bin/` is one standalone pipeline: fetch context from
//! the GitHub REST API, build a prompt, call the OpenAI completion API, recover
//! structured fields from the free-text reply, and apply side effects (comments,
//! labels, file writes, workflow dispatches). The brittle shared pieces — the
//! API gateway, the completion client, and the response-grammar parser — live
//! here so every pipeline uses the same tested code paths.
//!
//! Error handling follows a three-tier contract:
//! - **Fatal**: missing credentials or a failed fetch of the primary resource
//!   propagates out of `main` and exits the process with status 1.
//! - **Recoverable-with-default**: completion-API errors and missing markers in
//!   model output degrade to documented default values.
//! - **Logged-non-fatal**: failed side effects (comments, labels, dispatches)
//!   are logged and the run continues; the process still exits 0.

pub mod actions;
pub mod config;
pub mod github;
pub mod javadoc;
pub mod llm;
pub mod project;
pub mod response;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a binary: env-filtered, targets shown, stderr only
/// so stdout stays reserved for pipeline status output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
