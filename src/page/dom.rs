// Small DOM helpers shared by the page handlers. Style writes are best-effort.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Event, EventTarget, HtmlElement, window};

use crate::error::PageError;
use crate::evasive::{Rect, Viewport};

pub(super) fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

pub(super) fn by_id(id: &str) -> Option<HtmlElement> {
    document()?.get_element_by_id(id)?.dyn_into().ok()
}

pub(super) fn set_style(el: &HtmlElement, prop: &str, value: &str) {
    el.style().set_property(prop, value).ok();
}

pub(super) fn clear_style(el: &HtmlElement, prop: &str) {
    el.style().remove_property(prop).ok();
}

pub(super) fn set_class(el: &HtmlElement, class: &str, on: bool) {
    el.class_list().toggle_with_force(class, on).ok();
}

pub(super) fn rect_of(el: &HtmlElement) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

pub(super) fn viewport() -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    match window() {
        Some(w) => Viewport { width: dim(w.inner_width()), height: dim(w.inner_height()) },
        None => Viewport { width: 0.0, height: 0.0 },
    }
}

/// Attach a listener for the page's lifetime.
pub(super) fn listen(
    target: &EventTarget,
    kind: &str,
    f: impl FnMut(Event) + 'static,
) -> Result<(), PageError> {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Like `listen`, with an explicit `passive` flag (touch handlers that must prevent default).
pub(super) fn listen_with_passive(
    target: &EventTarget,
    kind: &str,
    passive: bool,
    f: impl FnMut(Event) + 'static,
) -> Result<(), PageError> {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
    let opts = AddEventListenerOptions::new();
    opts.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &opts,
    )?;
    closure.forget();
    Ok(())
}

/// Listen on an element by id; a missing element only disables that feature.
pub(super) fn listen_id(id: &str, kind: &str, f: impl FnMut(Event) + 'static) -> Result<(), PageError> {
    match by_id(id) {
        Some(el) => listen(&el, kind, f),
        None => {
            tracing::warn!(id, "element missing, feature disabled");
            Ok(())
        }
    }
}
