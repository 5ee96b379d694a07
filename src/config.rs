//! Board Configuration
//!
//! Endpoint paths, DOM anchors and timings. A page can override any of
//! them with an inline JSON block:
//!
//! ```html
//! <script type="application/json" id="board-config">{"poll_interval_ms": 10000}</script>
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BoardResult;

/// Id of the inline config element
pub const CONFIG_ELEMENT_ID: &str = "board-config";

/// Client configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Prefix for `PATCH {prefix}/{id}`
    pub task_endpoint: String,
    pub widgets_endpoint: String,
    pub workload_endpoint: String,
    pub progress_endpoint: String,
    /// Element replaced by the widgets fragment
    pub widgets_anchor: String,
    /// Element replaced by the workload fragment
    pub workload_anchor: String,
    /// Push channel event carrying `{id, state}`
    pub push_event: String,
    /// Fallback progress poll
    pub poll_interval_ms: u32,
    /// How long a toast stays on screen
    pub toast_ms: u32,
    /// One of error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            task_endpoint: "/tasks".to_string(),
            widgets_endpoint: "/dashboard/widgets".to_string(),
            workload_endpoint: "/dashboard/workload".to_string(),
            progress_endpoint: "/dashboard/progress.json".to_string(),
            widgets_anchor: "rightAside".to_string(),
            workload_anchor: "leftAside".to_string(),
            push_event: "task_updated".to_string(),
            poll_interval_ms: 5_000,
            toast_ms: 4_000,
            log_level: "info".to_string(),
        }
    }
}

impl BoardConfig {
    /// Parse an inline config block; missing fields keep their defaults
    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Read the config block from the current document, if the page has one
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match text {
            Some(json) => Self::from_json(&json).unwrap_or_else(|e| {
                log::warn!("[config] ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
