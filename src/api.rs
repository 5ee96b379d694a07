//! Dashboard Commands
//!
//! Frontend bindings to the dashboard server endpoints.

use std::rc::Rc;

use async_trait::async_trait;
use gloo_net::http::{Request, Response};

use crate::config::BoardConfig;
use crate::endpoints::{progress_url, task_url, widgets_url, workload_url};
use crate::error::{BoardError, BoardResult};
use crate::models::{ProgressRecord, TaskPatch, TaskRef};

/// Server calls the board needs. A non-success status is an error.
#[async_trait(?Send)]
pub trait BoardApi {
    /// `PATCH /tasks/{id}`
    async fn patch_task(&self, task: &TaskRef, patch: &TaskPatch) -> BoardResult<()>;

    /// Widgets fragment (HTML)
    async fn fetch_widgets(&self) -> BoardResult<String>;

    /// Workload fragment (HTML)
    async fn fetch_workload(&self) -> BoardResult<String>;

    async fn fetch_progress(&self) -> BoardResult<Vec<ProgressRecord>>;
}

/// `fetch`-backed implementation
pub struct HttpApi {
    config: Rc<BoardConfig>,
}

impl HttpApi {
    pub fn new(config: Rc<BoardConfig>) -> Self {
        Self { config }
    }
}

/// `location.search` of the current page
fn page_search() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn ensure_ok(resp: Response) -> BoardResult<Response> {
    if resp.ok() {
        Ok(resp)
    } else {
        Err(BoardError::Status(resp.status()))
    }
}

async fn get_text(url: &str) -> BoardResult<String> {
    let resp = ensure_ok(Request::get(url).send().await?)?;
    Ok(resp.text().await?)
}

#[async_trait(?Send)]
impl BoardApi for HttpApi {
    async fn patch_task(&self, task: &TaskRef, patch: &TaskPatch) -> BoardResult<()> {
        let url = task_url(&self.config, task);
        let resp = Request::patch(&url).json(patch)?.send().await?;
        ensure_ok(resp)?;
        Ok(())
    }

    async fn fetch_widgets(&self) -> BoardResult<String> {
        get_text(&widgets_url(&self.config, &page_search(), now_ms())).await
    }

    async fn fetch_workload(&self) -> BoardResult<String> {
        get_text(&workload_url(&self.config, &page_search(), now_ms())).await
    }

    async fn fetch_progress(&self) -> BoardResult<Vec<ProgressRecord>> {
        let resp = ensure_ok(Request::get(&progress_url(&self.config, now_ms())).send().await?)?;
        Ok(resp.json::<Vec<ProgressRecord>>().await?)
    }
}
