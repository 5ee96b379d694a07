//! Toast Notifications
//!
//! Non-blocking messages for failures the user should know about.

use std::cell::Cell;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::error::{BoardError, BoardResult};

pub trait Notifier {
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub message: String,
}

/// Stack of live toasts, newest last
#[component]
fn ToastStack(toasts: ReadSignal<Vec<Toast>>) -> impl IntoView {
    view! {
        <div class="board-toasts" role="status" aria-live="polite">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    view! { <div class="board-toast">{toast.message}</div> }
                }
            />
        </div>
    }
}

/// Notifier rendering Leptos toasts that dismiss themselves
pub struct ToastNotifier {
    toasts_read: ReadSignal<Vec<Toast>>,
    toasts_write: WriteSignal<Vec<Toast>>,
    next_id: Cell<u32>,
    lifetime_ms: u32,
}

impl ToastNotifier {
    pub fn new(lifetime_ms: u32) -> Self {
        let (toasts_read, toasts_write) = signal(Vec::<Toast>::new());
        Self {
            toasts_read,
            toasts_write,
            next_id: Cell::new(0),
            lifetime_ms,
        }
    }

    /// Mount the toast stack into a fresh container at the end of `<body>`
    pub fn mount(&self, document: &Document) -> BoardResult<()> {
        let body = document
            .body()
            .ok_or_else(|| BoardError::Dom("document has no body".to_string()))?;
        let host = document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| BoardError::Dom("toast host is not an HtmlElement".to_string()))?;
        body.append_child(&host)?;

        let toasts = self.toasts_read;
        leptos::mount::mount_to(host, move || view! { <ToastStack toasts=toasts /> }).forget();
        Ok(())
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, message: &str) {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.toasts_write.update(|toasts| {
            toasts.push(Toast {
                id,
                message: message.to_string(),
            })
        });

        let toasts = self.toasts_write;
        Timeout::new(self.lifetime_ms, move || {
            toasts.update(|toasts| toasts.retain(|t| t.id != id));
        })
        .forget();
    }
}
