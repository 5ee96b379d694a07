//! In-memory page, server and notifier for unit tests

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::api::BoardApi;
use crate::error::{BoardError, BoardResult};
use crate::models::{ProgressRecord, TaskPatch, TaskRef, TaskState};
use crate::notify::Notifier;
use crate::surface::Surface;

#[derive(Debug, Default, Clone)]
pub struct FakeElement {
    pub width: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
}

#[derive(Default)]
struct Page {
    columns: Vec<(TaskState, Vec<TaskRef>)>,
    elements: HashMap<String, FakeElement>,
}

impl Page {
    fn locate(&self, task: &TaskRef) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(col, (_, cards))| {
            cards.iter().position(|c| c == task).map(|idx| (col, idx))
        })
    }

    fn column_index(&self, state: TaskState) -> Option<usize> {
        self.columns.iter().position(|(s, _)| *s == state)
    }
}

/// Kanban columns plus a bag of elements addressed by id
#[derive(Default)]
pub struct FakeSurface {
    page: RefCell<Page>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(self, state: TaskState, cards: &[&str]) -> Self {
        let cards = cards.iter().map(|c| TaskRef::new(*c)).collect();
        self.page.borrow_mut().columns.push((state, cards));
        self
    }

    pub fn with_element(self, id: &str) -> Self {
        self.page
            .borrow_mut()
            .elements
            .insert(id.to_string(), FakeElement::default());
        self
    }

    /// Card ids of a column, front first
    pub fn column(&self, state: TaskState) -> Vec<String> {
        let page = self.page.borrow();
        page.column_index(state)
            .map(|i| page.columns[i].1.iter().map(|c| c.as_str().to_string()).collect())
            .unwrap_or_default()
    }

    pub fn width(&self, id: &str) -> Option<String> {
        self.page.borrow().elements.get(id).and_then(|e| e.width.clone())
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.page.borrow().elements.get(id).and_then(|e| e.text.clone())
    }

    pub fn html(&self, id: &str) -> Option<String> {
        self.page.borrow().elements.get(id).and_then(|e| e.html.clone())
    }

    fn insert_card(page: &mut Page, task: &TaskRef, col: usize, idx: usize) {
        let cards = &mut page.columns[col].1;
        let idx = idx.min(cards.len());
        cards.insert(idx, task.clone());
    }
}

impl Surface for FakeSurface {
    type List = TaskState;
    type Placement = (TaskState, usize);

    fn list_for_state(&self, state: TaskState) -> Option<TaskState> {
        self.page.borrow().column_index(state).map(|_| state)
    }

    fn placement_of(&self, task: &TaskRef) -> Option<(TaskState, usize)> {
        let page = self.page.borrow();
        page.locate(task).map(|(col, idx)| (page.columns[col].0, idx))
    }

    fn prepend_card(&self, task: &TaskRef, list: &TaskState) -> bool {
        let mut page = self.page.borrow_mut();
        let (Some((col, idx)), Some(dest)) = (page.locate(task), page.column_index(*list)) else {
            return false;
        };
        page.columns[col].1.remove(idx);
        Self::insert_card(&mut page, task, dest, 0);
        true
    }

    fn restore_card(&self, task: &TaskRef, placement: (TaskState, usize)) -> bool {
        let mut page = self.page.borrow_mut();
        let (Some((col, idx)), Some(dest)) = (page.locate(task), page.column_index(placement.0)) else {
            return false;
        };
        page.columns[col].1.remove(idx);
        Self::insert_card(&mut page, task, dest, placement.1);
        true
    }

    fn has_element(&self, id: &str) -> bool {
        self.page.borrow().elements.contains_key(id)
    }

    fn replace_anchor(&self, anchor_id: &str, html: &str) -> BoardResult<bool> {
        let mut page = self.page.borrow_mut();
        let Some(anchor) = page.elements.get_mut(anchor_id) else {
            return Ok(false);
        };
        if !html.contains(&format!("id=\"{}\"", anchor_id)) {
            return Err(BoardError::Body(format!("fragment has no #{}", anchor_id)));
        }
        anchor.html = Some(html.to_string());
        Ok(true)
    }

    fn set_width_pct(&self, id: &str, pct: u32) -> bool {
        match self.page.borrow_mut().elements.get_mut(id) {
            Some(el) => {
                el.width = Some(format!("{}%", pct));
                true
            }
            None => false,
        }
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        match self.page.borrow_mut().elements.get_mut(id) {
            Some(el) => {
                el.text = Some(text.to_string());
                true
            }
            None => false,
        }
    }
}

/// Scripted server. Every call is recorded by name.
pub struct FakeApi {
    pub calls: RefCell<Vec<&'static str>>,
    pub patches: RefCell<Vec<(TaskRef, TaskPatch)>>,
    pub patch_fails: Cell<bool>,
    /// Pending PATCH outcomes (true = accepted), consumed one per call before `patch_fails`
    pub patch_gates: RefCell<VecDeque<oneshot::Receiver<bool>>>,
    pub widgets_status: Cell<u16>,
    pub widgets_html: RefCell<String>,
    /// Pending widget responses, consumed one per call before `widgets_html`
    pub widgets_gates: RefCell<VecDeque<oneshot::Receiver<String>>>,
    pub workload_status: Cell<u16>,
    pub workload_html: RefCell<String>,
    pub progress_status: Cell<u16>,
    pub progress: RefCell<Vec<ProgressRecord>>,
    pub progress_gates: RefCell<VecDeque<oneshot::Receiver<Vec<ProgressRecord>>>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            patches: RefCell::new(Vec::new()),
            patch_fails: Cell::new(false),
            patch_gates: RefCell::new(VecDeque::new()),
            widgets_status: Cell::new(200),
            widgets_html: RefCell::new(r#"<aside id="rightAside">fresh widgets</aside>"#.to_string()),
            widgets_gates: RefCell::new(VecDeque::new()),
            workload_status: Cell::new(200),
            workload_html: RefCell::new(r#"<aside id="leftAside">fresh workload</aside>"#.to_string()),
            progress_status: Cell::new(200),
            progress: RefCell::new(Vec::new()),
            progress_gates: RefCell::new(VecDeque::new()),
        }
    }
}

impl FakeApi {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    /// Refresh calls only, sorted
    pub fn refreshes(&self) -> Vec<&'static str> {
        let mut calls: Vec<_> = self.calls().into_iter().filter(|c| *c != "patch").collect();
        calls.sort_unstable();
        calls
    }
}

fn status_result(status: u16) -> BoardResult<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(BoardError::Status(status))
    }
}

#[async_trait(?Send)]
impl BoardApi for FakeApi {
    async fn patch_task(&self, task: &TaskRef, patch: &TaskPatch) -> BoardResult<()> {
        self.calls.borrow_mut().push("patch");
        self.patches.borrow_mut().push((task.clone(), patch.clone()));
        let gate = self.patch_gates.borrow_mut().pop_front();
        let accepted = match gate {
            Some(gate) => gate.await.unwrap_or(false),
            None => !self.patch_fails.get(),
        };
        if !accepted {
            return Err(BoardError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    async fn fetch_widgets(&self) -> BoardResult<String> {
        self.calls.borrow_mut().push("widgets");
        let gate = self.widgets_gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            return gate.await.map_err(|_| BoardError::Transport("cancelled".to_string()));
        }
        status_result(self.widgets_status.get())?;
        Ok(self.widgets_html.borrow().clone())
    }

    async fn fetch_workload(&self) -> BoardResult<String> {
        self.calls.borrow_mut().push("workload");
        status_result(self.workload_status.get())?;
        Ok(self.workload_html.borrow().clone())
    }

    async fn fetch_progress(&self) -> BoardResult<Vec<ProgressRecord>> {
        self.calls.borrow_mut().push("progress");
        let gate = self.progress_gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            return gate.await.map_err(|_| BoardError::Transport("cancelled".to_string()));
        }
        status_result(self.progress_status.get())?;
        Ok(self.progress.borrow().clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
