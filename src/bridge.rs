//! Async message contract with the document's script environment.
//!
//! Inbound, the document reports placeholder geometry and layout settling
//! over named script-message channels; payloads arrive as JSON values.
//! Outbound, the host evaluates small scripts in the document, fire and
//! forget: failures are logged with the offending script text and never
//! propagate.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use tokio::task::JoinHandle;

/// Failure reported asynchronously by the document environment for one
/// script evaluation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ScriptError(pub String);

/// Document script environment seam.
pub trait ScriptHost: Send + Sync {
    /// Evaluate `script` in the document. The returned future resolves when
    /// the document reports completion; the caller never awaits it beyond
    /// logging the outcome.
    fn evaluate(&self, script: String) -> BoxFuture<'static, Result<(), ScriptError>>;
}

/// Inbound script-message channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptChannel {
    /// Placeholder geometry report: `{id, x, y}`.
    Position,
    /// Document layout has settled; reallocate every child.
    Allocate,
    /// The document finished consuming the latest pixel snapshot.
    UpdateCanvasDone,
}

impl ScriptChannel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "position" => Some(ScriptChannel::Position),
            "allocate" => Some(ScriptChannel::Allocate),
            "update_canvas_done" => Some(ScriptChannel::UpdateCanvasDone),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScriptChannel::Position => "position",
            ScriptChannel::Allocate => "allocate",
            ScriptChannel::UpdateCanvasDone => "update_canvas_done",
        }
    }
}

/// Payload of a `position` message.
#[derive(Debug, Deserialize)]
pub struct PositionReport {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

pub(crate) fn update_canvas_script(object: &str, id: &str, width: u32, height: u32) -> String {
    format!(
        "if (window.hasOwnProperty ('{object}')) {object}.update_canvas('{id}', {width}, {height});"
    )
}

pub(crate) fn visibility_script(object: &str, id: &str, visible: bool) -> String {
    format!(
        "if (window.hasOwnProperty ('{object}')) {object}.children['{id}'].style.visibility = '{}';",
        if visible { "visible" } else { "hidden" }
    )
}

/// One spawned, not yet reaped script evaluation.
pub(crate) struct PendingScript {
    pub script: String,
    pub handle: JoinHandle<Result<(), ScriptError>>,
}

impl PendingScript {
    /// Polls the evaluation without blocking. `Some` once it has finished.
    pub fn poll(&mut self) -> Option<Result<(), ScriptError>> {
        (&mut self.handle).now_or_never().map(|join| match join {
            Ok(result) => result,
            Err(e) => Err(ScriptError(format!("Join error: {}", e))),
        })
    }
}
