// Toasts, modals and cue signals for the host page.

use wasm_bindgen::JsValue;
use web_sys::{CustomEvent, CustomEventInit, Document, HtmlElement};
use wasm_bindgen::JsCast;

use super::{dom, timer};

/// Effects the host page renders (sounds, confetti). Raised as a `valentine-cue` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Click,
    Success,
    Error,
    Confetti,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Click => "click",
            Cue::Success => "success",
            Cue::Error => "error",
            Cue::Confetti => "confetti",
        }
    }
}

pub const CUE_EVENT: &str = "valentine-cue";

/// Dispatch a cue. Listeners run synchronously, so never call this with the page state borrowed.
pub fn cue(cue: Cue) {
    let Some(doc) = dom::document() else {
        return;
    };
    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from_str(cue.name()));
    match CustomEvent::new_with_event_init_dict(CUE_EVENT, &init) {
        Ok(ev) => {
            doc.dispatch_event(&ev).ok();
        }
        Err(err) => tracing::debug!(?err, cue = cue.name(), "cue dropped"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Error,
    Info,
}

/// Toast at the top of the viewport, removed after `duration_ms` plus a fade.
pub fn toast(text: &str, tone: Tone, duration_ms: u32, fade_ms: u32) {
    let Some(doc) = dom::document() else {
        return;
    };
    let Some(el) = create_div(&doc) else {
        return;
    };
    let (class, bg) = match tone {
        Tone::Error => ("grid-message error", "#ff4444"),
        Tone::Info => ("grid-message info", "#32cd32"),
    };
    el.set_class_name(class);
    el.set_text_content(Some(text));
    el.set_attribute("style", &format!("position:fixed; top:20px; left:50%; transform:translateX(-50%); background:{bg}; color:white; padding:15px 30px; border:3px solid #000; font-family:'Press Start 2P', cursive; font-size:10px; z-index:1000; animation:slideIn 0.3s ease-out; box-shadow:4px 4px 0 #000; max-width:90%; text-align:center; line-height:1.6;")).ok();
    if let Some(body) = doc.body() {
        if body.append_child(&el).is_err() {
            return;
        }
    }
    timer::schedule(duration_ms, move || {
        dom::set_style(&el, "animation", "fadeOut 0.3s ease-out");
        timer::schedule(fade_ms, move || el.remove());
    });
}

/// Centered modal with a close button; a click on the backdrop closes it too.
pub fn modal(text: &str, fade_ms: u32) {
    let Some(doc) = dom::document() else {
        return;
    };
    let (Some(backdrop), Some(content), Some(message)) =
        (create_div(&doc), create_div(&doc), create_div(&doc))
    else {
        return;
    };
    let Some(close) = doc.create_element("button").ok().and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    backdrop.set_class_name("custom-modal");
    backdrop.set_attribute("style", "position:fixed; top:0; left:0; width:100%; height:100%; background:rgba(0,0,0,0.8); display:flex; align-items:center; justify-content:center; z-index:10000; animation:fadeIn 0.3s ease-out;").ok();
    content.set_class_name("modal-content");
    content.set_attribute("style", "background:#f5f5dc; border:4px solid #000; padding:40px; max-width:500px; text-align:center; box-shadow:8px 8px 0 #000; animation:popIn 0.3s ease-out;").ok();
    message.set_class_name("modal-message");
    message.set_text_content(Some(text));
    message.set_attribute("style", "font-family:'Press Start 2P', cursive; font-size:14px; color:#d63384; margin-bottom:30px; line-height:1.8;").ok();
    close.set_class_name("pixel-btn modal-close");
    close.set_text_content(Some("Close ♥"));

    if content.append_child(&message).is_err()
        || content.append_child(&close).is_err()
        || backdrop.append_child(&content).is_err()
    {
        return;
    }
    let Some(body) = doc.body() else {
        return;
    };
    if body.append_child(&backdrop).is_err() {
        return;
    }

    let dismiss = {
        let backdrop = backdrop.clone();
        move || {
            dom::set_style(&backdrop, "animation", "fadeOut 0.3s ease-out");
            let backdrop = backdrop.clone();
            timer::schedule(fade_ms, move || backdrop.remove());
        }
    };
    let on_close = dismiss.clone();
    dom::listen(&close, "click", move |_| on_close()).ok();
    let backdrop_target = backdrop.clone();
    dom::listen(&backdrop, "click", move |ev| {
        let target = ev.target();
        let own: &web_sys::EventTarget = backdrop_target.as_ref();
        if target.as_ref() == Some(own) {
            dismiss();
        }
    })
    .ok();
}

fn create_div(doc: &Document) -> Option<HtmlElement> {
    doc.create_element("div").ok()?.dyn_into().ok()
}
