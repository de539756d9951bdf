use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// A model reply split into its structured payload and the prose around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub payload: Option<Value>,
    pub display_text: String,
}

fn fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?is)```json(.*?)```").expect("fence pattern compiles")
    })
}

/// Pull the first fenced ```json block that parses out of `reply`.
/// Blocks that fail to parse are skipped and stay in the display text.
pub fn extract(reply: &str) -> Extraction {
    for caps in fence().captures_iter(reply) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else { continue };
        match serde_json::from_str::<Value>(inner.as_str().trim()) {
            Ok(payload) => {
                let mut rest = String::with_capacity(reply.len() - whole.len());
                rest.push_str(&reply[..whole.start()]);
                rest.push_str(&reply[whole.end()..]);
                return Extraction { payload: Some(payload), display_text: rest.trim().to_string() };
            }
            Err(e) => {
                tracing::debug!(offset = whole.start(), error = %e, "skipping unparseable json block");
            }
        }
    }
    Extraction { payload: None, display_text: reply.trim().to_string() }
}
