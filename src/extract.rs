//! Best-effort recovery of a JSON object from free-form model text.

use serde_json::Value;
use tracing::{debug, warn};

/// Parse the span from the first `{` to the last `}` (inclusive) as JSON.
///
/// Returns `None` when there is no `{`, no `}` after it, or the span does not
/// parse. Several objects in one reply collapse into a single span that
/// usually fails to parse; callers get `None` in that case too.
pub fn extract_json_object(reply: &str) -> Option<Value> {
    let start = reply.find('{')?;
    let Some(end) = reply.rfind('}').filter(|end| *end > start) else {
        warn!("model reply has no closing brace after the first opening brace");
        return None;
    };
    let span = reply.get(start..=end)?;
    debug!(json = span, "extracted JSON span");

    match serde_json::from_str::<Value>(span) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                error = %e,
                text_preview = %reply.chars().take(200).collect::<String>(),
                "failed to parse JSON from model reply"
            );
            None
        }
    }
}
