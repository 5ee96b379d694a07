//! Board DragDrop Utilities
//!
//! Gesture sessions for native HTML5 drag-and-drop.
//! A session opens on `dragstart` and is consumed by at most one drop.
//! `dragend` closes whatever the drop did not consume, so a cancelled
//! gesture never leaks into the next one.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// One drag gesture
#[derive(Clone, Debug, PartialEq)]
pub struct Gesture<T> {
    /// What is being dragged
    pub payload: T,
    /// Gesture number, increases on every `begin`
    pub serial: u32,
}

/// Drag session signals
pub struct DragSession<T: Send + Sync + 'static> {
    pub active_read: ReadSignal<Option<Gesture<T>>>,
    active_write: WriteSignal<Option<Gesture<T>>>,
    serial_read: ReadSignal<u32>,
    serial_write: WriteSignal<u32>,
}

impl<T: Send + Sync + 'static> Clone for DragSession<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for DragSession<T> {}

pub fn create_drag_session<T: Send + Sync + 'static>() -> DragSession<T> {
    let (active_read, active_write) = signal(None::<Gesture<T>>);
    let (serial_read, serial_write) = signal(0u32);
    DragSession {
        active_read,
        active_write,
        serial_read,
        serial_write,
    }
}

impl<T> DragSession<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Open a new gesture, replacing any unconsumed one
    pub fn begin(&self, payload: T) -> u32 {
        let serial = self.serial_read.get_untracked().wrapping_add(1);
        self.serial_write.set(serial);
        self.active_write.set(Some(Gesture { payload, serial }));
        serial
    }

    /// Consume the open gesture. Returns None outside a gesture.
    pub fn take(&self) -> Option<Gesture<T>> {
        let gesture = self.active_read.get_untracked();
        if gesture.is_some() {
            self.active_write.set(None);
        }
        gesture
    }

    /// Close the open gesture without consuming it
    pub fn cancel(&self) {
        if let Some(gesture) = self.active_read.get_untracked() {
            log::debug!("[dnd] gesture {} cancelled", gesture.serial);
            self.active_write.set(None);
        }
    }
}

/// Stamp the payload into the DataTransfer.
/// Firefox refuses to start a drag whose DataTransfer is empty.
pub fn mark_transfer(ev: &web_sys::DragEvent, text: &str) {
    if let Some(dt) = ev.data_transfer() {
        let _ = dt.set_data("text/plain", text);
        dt.set_effect_allowed("move");
    }
}

/// Bind global dragend handler that cancels unconsumed gestures
pub fn bind_global_dragend<T>(session: DragSession<T>)
where
    T: Clone + Send + Sync + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_dragend = Closure::<dyn FnMut(web_sys::DragEvent)>::new(move |_ev: web_sys::DragEvent| {
        session.cancel();
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("dragend", on_dragend.as_ref().unchecked_ref());
        }
    }
    on_dragend.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DragSession<String> {
        let owner = Owner::new();
        owner.set();
        // Keep the owner alive so the session's signals outlive this helper
        std::mem::forget(owner);
        create_drag_session::<String>()
    }

    #[test]
    fn test_take_consumes_gesture() {
        let dnd = session();
        dnd.begin("7".to_string());

        let gesture = dnd.take().unwrap();
        assert_eq!(gesture.payload, "7");
        assert_eq!(gesture.serial, 1);

        // A second drop without a new dragstart sees nothing
        assert!(dnd.take().is_none());
    }

    #[test]
    fn test_begin_overwrites_previous_gesture() {
        let dnd = session();
        dnd.begin("1".to_string());
        let serial = dnd.begin("2".to_string());

        assert_eq!(serial, 2);
        assert_eq!(dnd.take().map(|g| g.payload).as_deref(), Some("2"));
    }

    #[test]
    fn test_cancel_clears_gesture() {
        let dnd = session();
        dnd.begin("3".to_string());
        dnd.cancel();

        assert!(dnd.take().is_none());
        // Cancelling an idle session is harmless
        dnd.cancel();
    }
}
