//! Endpoint URLs
//!
//! Pure URL builders; the caller supplies the page query and the clock.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::BoardConfig;
use crate::models::TaskRef;

/// Characters escaped inside one path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Append the `ts` cache buster.
/// `search` is `location.search`: empty or starting with `?`.
pub fn with_cache_buster(path: &str, search: &str, ts: u64) -> String {
    let sep = if search.is_empty() { '?' } else { '&' };
    format!("{}{}{}ts={}", path, search, sep, ts)
}

/// `PATCH` target for one task
pub fn task_url(config: &BoardConfig, task: &TaskRef) -> String {
    format!(
        "{}/{}",
        config.task_endpoint.trim_end_matches('/'),
        utf8_percent_encode(task.as_str(), SEGMENT)
    )
}

/// Widgets fragment, filtered like the page itself
pub fn widgets_url(config: &BoardConfig, search: &str, ts: u64) -> String {
    with_cache_buster(&config.widgets_endpoint, search, ts)
}

/// Workload fragment, filtered like the page itself
pub fn workload_url(config: &BoardConfig, search: &str, ts: u64) -> String {
    with_cache_buster(&config.workload_endpoint, search, ts)
}

/// Progress is global, the page filter does not apply
pub fn progress_url(config: &BoardConfig, ts: u64) -> String {
    with_cache_buster(&config.progress_endpoint, "", ts)
}
