//! Page Bindings
//!
//! Wires browser events to [`BoardSync`]: inline drag/drop handlers,
//! the Socket.IO push channel, page load, the progress poll and tab
//! visibility.

use std::rc::Rc;

use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, DragEvent, HtmlElement, VisibilityState};

use crate::api::HttpApi;
use crate::config::BoardConfig;
use crate::error::{BoardError, BoardResult};
use crate::models::{TaskRef, TaskUpdated};
use crate::notify::ToastNotifier;
use crate::surface::DocumentSurface;
use crate::sync::BoardSync;

pub type Board = BoardSync<HttpApi, DocumentSurface>;

#[wasm_bindgen]
extern "C" {
    /// Socket.IO client connection
    type Socket;

    #[wasm_bindgen(js_name = io, catch)]
    fn io_connect() -> Result<Socket, JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &Socket, event: &str, handler: &js_sys::Function);
}

/// Build the board and bind it to the current page
pub fn start(config: BoardConfig) -> BoardResult<()> {
    let config = Rc::new(config);
    let surface = DocumentSurface::current()
        .ok_or_else(|| BoardError::Dom("no document".to_string()))?;
    let document = surface.document().clone();

    let notifier = ToastNotifier::new(config.toast_ms);
    if let Err(e) = notifier.mount(&document) {
        log::warn!("toasts unavailable: {}", e);
    }

    let board = Rc::new(BoardSync::new(
        config.clone(),
        HttpApi::new(config),
        surface,
        Rc::new(notifier),
    ));

    install_drag_handlers(&board)?;
    board_dragdrop::bind_global_dragend(board.session());
    connect_push(&board);
    on_page_ready(&document, board.clone());
    start_poll(board.clone());
    bind_visibility(&document, board);
    Ok(())
}

fn current_element(ev: &DragEvent) -> Option<HtmlElement> {
    ev.current_target()?.dyn_into::<HtmlElement>().ok()
}

/// Expose `window.dragTask` / `window.dropTask` for inline markup handlers
fn install_drag_handlers(board: &Rc<Board>) -> BoardResult<()> {
    let window = web_sys::window().ok_or_else(|| BoardError::Dom("no window".to_string()))?;

    let b = board.clone();
    let drag_task = Closure::<dyn FnMut(DragEvent)>::new(move |ev: DragEvent| {
        let Some(card) = current_element(&ev) else {
            return;
        };
        match card.dataset().get("task") {
            Some(id) => {
                board_dragdrop::mark_transfer(&ev, &id);
                b.drag_start(TaskRef::new(id));
            }
            None => log::warn!("dragstart on an element without data-task"),
        }
    });

    let b = board.clone();
    let drop_task = Closure::<dyn FnMut(DragEvent)>::new(move |ev: DragEvent| {
        ev.prevent_default();
        // A drop without a usable column still consumes the gesture and refreshes
        let column = current_element(&ev);
        let state = column
            .as_ref()
            .and_then(|c| c.dataset().get("state"))
            .unwrap_or_default();
        let list = column.and_then(|c| c.query_selector(".list").ok().flatten());
        let b = b.clone();
        spawn_local(async move {
            b.drop_on(&state, list).await;
        });
    });

    js_sys::Reflect::set(&window, &JsValue::from_str("dragTask"), drag_task.as_ref())?;
    js_sys::Reflect::set(&window, &JsValue::from_str("dropTask"), drop_task.as_ref())?;
    drag_task.forget();
    drop_task.forget();
    Ok(())
}

/// Subscribe to task updates if the page loaded the Socket.IO client
fn connect_push(board: &Rc<Board>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let has_io = js_sys::Reflect::get(&window, &JsValue::from_str("io"))
        .map(|v| v.is_function())
        .unwrap_or(false);
    if !has_io {
        log::debug!("no push channel on this page");
        return;
    }

    let socket = match io_connect() {
        Ok(socket) => socket,
        Err(e) => {
            log::warn!("push channel connect failed: {:?}", e);
            return;
        }
    };

    let event_name = board.config().push_event.clone();
    let b = board.clone();
    let name = event_name.clone();
    let handler = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
        let b = b.clone();
        match serde_wasm_bindgen::from_value::<TaskUpdated>(payload) {
            Ok(event) => spawn_local(async move {
                b.task_updated(event).await;
            }),
            Err(e) => {
                log::warn!("undecodable {} payload: {}", name, e);
                spawn_local(async move {
                    b.refresh_all().await;
                });
            }
        }
    });
    socket.on(&event_name, handler.as_ref().unchecked_ref());
    handler.forget();
    log::info!("listening for {} pushes", event_name);
}

/// Initial refresh once the document is parsed
fn on_page_ready(document: &Document, board: Rc<Board>) {
    let refresh = move || {
        spawn_local(async move {
            board.refresh_all().await;
        })
    };
    if document.ready_state() == "loading" {
        let cb = Closure::once_into_js(refresh);
        let _ = document.add_event_listener_with_callback("DOMContentLoaded", cb.unchecked_ref());
    } else {
        refresh();
    }
}

/// Progress poll, independent of pushes
fn start_poll(board: Rc<Board>) {
    let period = board.config().poll_interval_ms;
    Interval::new(period, move || {
        let b = board.clone();
        spawn_local(async move {
            b.refresh_progress().await;
        });
    })
    .forget();
}

/// Catch up on anything missed while the tab was hidden
fn bind_visibility(document: &Document, board: Rc<Board>) {
    let doc = document.clone();
    let on_change = Closure::<dyn FnMut()>::new(move || {
        if doc.visibility_state() == VisibilityState::Visible {
            let b = board.clone();
            spawn_local(async move {
                b.refresh_all().await;
            });
        }
    });
    let _ = document.add_event_listener_with_callback("visibilitychange", on_change.as_ref().unchecked_ref());
    on_change.forget();
}
