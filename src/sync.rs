//! Board Synchronization
//!
//! Keeps the rendered board in step with the server. Every trigger
//! (drop, push event, poll tick, tab becoming visible) ends in the same
//! refreshers, each of which re-reads authoritative state on its own.
//! A failure in one refresher never blocks the others.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use board_dragdrop::{create_drag_session, DragSession};
use log::Level;

use crate::api::BoardApi;
use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::models::{TaskPatch, TaskRef, TaskState, TaskUpdated};
use crate::notify::Notifier;
use crate::plan::{self, fragment_plan, progress_plan, DomPatch};
use crate::sequencer::{Endpoint, RequestSequencer, Ticket};
use crate::surface::Surface;

/// What became of a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Server accepted the new state
    Committed,
    /// Server call failed, card put back where it was
    RolledBack,
    /// Destination state unknown, nothing moved or sent.
    /// The server only accepts the six kanban states.
    Rejected,
    /// Server call failed after a newer drop of the same card;
    /// the card stays where the newer drop put it
    Superseded,
    /// Drop arrived outside a drag gesture
    NoGesture,
}

pub struct BoardSync<A, S> {
    config: Rc<BoardConfig>,
    api: A,
    surface: S,
    session: DragSession<TaskRef>,
    sequencer: RequestSequencer,
    notifier: Rc<dyn Notifier>,
    /// Gesture serial of the latest in-flight drop per card
    latest_moves: RefCell<HashMap<TaskRef, u32>>,
}

impl<A: BoardApi, S: Surface> BoardSync<A, S> {
    pub fn new(config: Rc<BoardConfig>, api: A, surface: S, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            config,
            api,
            surface,
            session: create_drag_session(),
            sequencer: RequestSequencer::new(),
            notifier,
            latest_moves: RefCell::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn session(&self) -> DragSession<TaskRef> {
        self.session
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    // ========================
    // Drag & Drop
    // ========================

    pub fn drag_start(&self, task: TaskRef) {
        let serial = self.session.begin(task.clone());
        log::debug!("drag #{} started for task {}", serial, task);
    }

    pub fn cancel_drag(&self) {
        self.session.cancel();
    }

    /// Drop onto the column `state`, whose card list is `list`.
    /// Refreshers run afterward whatever the outcome.
    pub async fn drop_on(&self, state: &str, list: Option<S::List>) -> DropOutcome {
        let outcome = self.move_dropped(state, list).await;
        self.refresh_all().await;
        outcome
    }

    async fn move_dropped(&self, state: &str, list: Option<S::List>) -> DropOutcome {
        let Some(gesture) = self.session.take() else {
            log::warn!("drop on `{}` without a drag in progress", state);
            return DropOutcome::NoGesture;
        };
        let (task, serial) = (gesture.payload, gesture.serial);

        let state = match state.parse::<TaskState>() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("drop of task {} rejected: {}", task, e);
                return DropOutcome::Rejected;
            }
        };

        self.latest_moves.borrow_mut().insert(task.clone(), serial);

        // Optimistic move, remembering where the card came from
        let prior = list.as_ref().and_then(|list| {
            let prior = self.surface.placement_of(&task)?;
            self.surface.prepend_card(&task, list).then_some(prior)
        });

        let result = self.api.patch_task(&task, &TaskPatch::state(state)).await;
        let latest = self.settle_move(&task, serial);

        match result {
            Ok(()) => {
                log::info!("task {} moved to {}", task, state);
                DropOutcome::Committed
            }
            Err(e) if !latest => {
                log::warn!("PATCH failed for task {} after a newer drop, keeping it: {}", task, e);
                DropOutcome::Superseded
            }
            Err(e) => {
                log::error!("PATCH failed for task {}: {}", task, e);
                if let Some(prior) = prior {
                    self.surface.restore_card(&task, prior);
                }
                self.notifier
                    .notify(&format!("Could not move task {} to {}: {}", task, state, e));
                DropOutcome::RolledBack
            }
        }
    }

    /// Forget the in-flight move `serial` of `task`.
    /// False if a newer drop of the same card has started since.
    fn settle_move(&self, task: &TaskRef, serial: u32) -> bool {
        let mut moves = self.latest_moves.borrow_mut();
        match moves.get(task) {
            Some(&latest) if latest == serial => {
                moves.remove(task);
                true
            }
            _ => false,
        }
    }

    // ========================
    // Push Events
    // ========================

    /// Handle a `task_updated` push. Returns whether a card moved.
    pub async fn task_updated(&self, event: TaskUpdated) -> bool {
        let moved = self.relocate(&event);
        self.refresh_all().await;
        moved
    }

    fn relocate(&self, event: &TaskUpdated) -> bool {
        let Some(raw) = event.state.as_deref() else {
            return false;
        };
        let state = match raw.parse::<TaskState>() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("push for task {} ignored: {}", event.id, e);
                return false;
            }
        };
        match self.surface.list_for_state(state) {
            Some(list) => self.surface.prepend_card(&event.id, &list),
            None => false,
        }
    }

    // ========================
    // Refreshers
    // ========================

    /// Run the three refreshers concurrently
    pub async fn refresh_all(&self) {
        futures::join!(self.refresh_widgets(), self.refresh_workload(), self.refresh_progress());
    }

    /// Replace the widgets panel. No-op on pages without it.
    pub async fn refresh_widgets(&self) -> bool {
        let anchor = self.config.widgets_anchor.as_str();
        if !self.surface.has_element(anchor) {
            return false;
        }
        let ticket = self.sequencer.issue(Endpoint::Widgets);
        match self.api.fetch_widgets().await {
            Ok(html) => self.apply_admitted(ticket, fragment_plan(anchor, html)),
            Err(e) => {
                report(Endpoint::Widgets, &e);
                false
            }
        }
    }

    /// Replace the workload panel. No-op on pages without it.
    pub async fn refresh_workload(&self) -> bool {
        let anchor = self.config.workload_anchor.as_str();
        if !self.surface.has_element(anchor) {
            return false;
        }
        let ticket = self.sequencer.issue(Endpoint::Workload);
        match self.api.fetch_workload().await {
            Ok(html) => self.apply_admitted(ticket, fragment_plan(anchor, html)),
            Err(e) => {
                report(Endpoint::Workload, &e);
                false
            }
        }
    }

    /// Patch progress bars and labels in place
    pub async fn refresh_progress(&self) -> bool {
        let ticket = self.sequencer.issue(Endpoint::Progress);
        match self.api.fetch_progress().await {
            Ok(records) => self.apply_admitted(ticket, progress_plan(&records)),
            Err(e) => {
                report(Endpoint::Progress, &e);
                false
            }
        }
    }

    /// Apply a response unless a newer one already landed.
    /// Only an applied response is admitted, so a malformed newer one
    /// leaves older responses usable.
    fn apply_admitted(&self, ticket: Ticket, patches: Vec<DomPatch>) -> bool {
        if !self.sequencer.is_fresh(ticket) {
            log::debug!("discarding stale {:?} response #{}", ticket.endpoint, ticket.seq);
            return false;
        }
        match plan::apply(&self.surface, patches) {
            Ok(landed) => {
                self.sequencer.admit(ticket);
                log::debug!("{:?} response #{} patched {} nodes", ticket.endpoint, ticket.seq, landed);
                true
            }
            Err(e) => {
                report(ticket.endpoint, &e);
                false
            }
        }
    }
}

/// Widgets are optional per page and stay quiet; a bad status is
/// expected churn everywhere.
fn report(endpoint: Endpoint, err: &BoardError) {
    let level = match (endpoint, err) {
        (_, BoardError::Status(_)) => Level::Debug,
        (Endpoint::Widgets, _) => Level::Debug,
        _ => Level::Error,
    };
    log::log!(level, "{:?} refresh failed: {}", endpoint, err);
}
