//! Turn observers
//!
//! Hooks invoked around each reasoning round trip. All methods default to
//! no-ops so an observer only implements what it needs.

use tracing::{debug, info, warn};

pub trait TurnObserver: Send + Sync {
    fn on_turn_start(&self, _session_id: &str, _user_text: &str) {}

    fn on_tool_call(&self, _name: &str, _ok: bool) {}

    /// `outcome` is the reply on success, the error text on failure
    fn on_turn_end(&self, _session_id: &str, _outcome: Result<&str, &str>) {}
}

/// Observer that does nothing
pub struct NoopObserver;

impl TurnObserver for NoopObserver {}

/// Observer that reports turns through `tracing`
pub struct TracingObserver;

impl TurnObserver for TracingObserver {
    fn on_turn_start(&self, session_id: &str, user_text: &str) {
        info!(session_id, "Turn started");
        debug!(session_id, "User text: {}", user_text);
    }

    fn on_tool_call(&self, name: &str, ok: bool) {
        if ok {
            debug!(tool = name, "Tool call succeeded");
        } else {
            warn!(tool = name, "Tool call returned an error");
        }
    }

    fn on_turn_end(&self, session_id: &str, outcome: Result<&str, &str>) {
        match outcome {
            Ok(reply) => {
                info!(session_id, "Turn finished");
                debug!(session_id, "Reply: {}", reply);
            }
            Err(e) => warn!(session_id, "Turn failed: {}", e),
        }
    }
}
