//! Library side of the `cbx` binary
//!
//! Loads a JSON document snapshot, installs the engine on it and runs one
//! guard pass, the way a form submission would.

pub mod report;

pub use report::{BoxReport, CheckReport};

use anyhow::{Context, Result};
use cbx_dom::{Document, MemoryDocument};
use cbx_engine::{ActionEvent, CbxBuilder, EngineConfig, EventKind};
use std::path::Path;
use tracing::debug;

/// Run a guard pass over `snapshot`
///
/// `fields` overrides the configured field selector.
pub fn run_check(
    snapshot: &Path,
    config: Option<&Path>,
    fields: Option<&str>,
) -> Result<CheckReport> {
    let config = match config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let doc = MemoryDocument::load(snapshot)
        .with_context(|| format!("loading snapshot {}", snapshot.display()))?;

    let selector = fields.unwrap_or(&config.field_selector).to_string();
    let cbx = CbxBuilder::new().config(config).install(doc)?;

    let (root, targets) = cbx.with_document(|doc| (doc.root(), doc.query_all(&selector, None)));
    debug!(%selector, fields = targets.len(), "running guard pass");

    let mut event = ActionEvent::new(EventKind::Submit, root);
    let outcome = cbx.stop_on_broken_constraints(&mut event, &targets);

    Ok(cbx.with_document(|doc| {
        CheckReport::new(&*doc, snapshot.display().to_string(), targets.len(), &outcome)
    }))
}

/// Names of the built-in constraints
#[must_use]
pub fn builtin_constraints() -> Vec<String> {
    cbx_constraint::ConstraintRegistry::builtin()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}
