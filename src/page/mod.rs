//! DOM glue for the Valentine page.
//!
//! Owns the single `PageState` in a `thread_local!` and wires every document listener to the
//! pure components (`ScreenController`, `EvasiveTarget`, `VerificationPuzzle`, `CheckboxFlow`,
//! `KeyWatcher`). Handlers borrow the state for the duration of one callback; anything that can
//! re-enter our own listeners synchronously (`dispatchEvent`, cues) runs after the borrow ends.
//!
//! Expected markup: one container per screen (`screen-intro`, `screen-question`,
//! `screen-verification`, `screen-loading`, `screen-puzzle`, `screen-success`) plus the controls
//! `start-envelope`, `yes-btn`, `no-btn`, `robot-checkbox`, `checkbox`, `progress-fill`,
//! `home-btn`, `image-grid`, `verify-btn`, `refresh-btn`, `audio-btn`, `info-btn` and any number
//! of `.pixel-heart` decorations. Missing controls disable what they drive.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement, MouseEvent, TouchEvent, window};

use crate::checkbox::{CheckboxFlow, Progress};
use crate::config::PageConfig;
use crate::easter::{HEARTS_MESSAGE, HeartCounter, KONAMI_MESSAGE, KeyAction, KeyWatcher};
use crate::error::{PageError, VerifyError};
use crate::evasive::{EvasionMove, EvasiveTarget, Point};
use crate::logging;
use crate::puzzle::{self, ItemId, VerificationPuzzle};
use crate::rng::EntropyRandom;
use crate::screen::{Screen, ScreenController};

mod dom;
pub mod overlay;
mod timer;

use overlay::{Cue, Tone};

/// Document event raised once per accepted puzzle.
pub const GRID_VERIFIED_EVENT: &str = "gridVerified";

const NO_BUTTON: &str = "no-btn";
const PLACEHOLDER_CLASS: &str = "no-btn-placeholder";

struct PageState {
    cfg: PageConfig,
    screens: ScreenController,
    evasive: EvasiveTarget,
    puzzle: VerificationPuzzle,
    checkbox: CheckboxFlow,
    keys: KeyWatcher,
    hearts: HeartCounter,
    rng: EntropyRandom,
    // Click handlers of the current grid tiles; dropped with the tiles on re-population.
    tile_listeners: Vec<Closure<dyn FnMut(Event)>>,
}

thread_local! {
    static PAGE_STATE: RefCell<Option<PageState>> = const { RefCell::new(None) };
}

/// Run `f` against the page state. `None` before `start` or when called re-entrantly.
fn with_state<R>(f: impl FnOnce(&mut PageState) -> R) -> Option<R> {
    PAGE_STATE.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            tracing::warn!("page state busy, event dropped");
            None
        }
    })
}

pub(crate) fn start(cfg: PageConfig) -> Result<(), PageError> {
    cfg.validate()?;
    logging::init(&cfg.log_level);

    let win = window().ok_or(PageError::NoWindow)?;
    let doc = win.document().ok_or(PageError::NoDocument)?;

    let state = PageState {
        screens: ScreenController::new(),
        evasive: EvasiveTarget::new(cfg.evasion.clone()),
        puzzle: VerificationPuzzle::new(&cfg.puzzle),
        checkbox: CheckboxFlow::new(cfg.flow.progress_step_percent),
        keys: KeyWatcher::new(),
        hearts: HeartCounter::new(cfg.flow.heart_clicks_for_confetti),
        rng: EntropyRandom::new(),
        tile_listeners: Vec::new(),
        cfg,
    };
    PAGE_STATE.with(|cell| cell.replace(Some(state)));

    // Narrative buttons
    dom::listen_id("start-envelope", "click", |_| on_envelope())?;
    dom::listen_id("yes-btn", "click", |_| on_yes())?;
    dom::listen_id("home-btn", "click", |_| on_home())?;
    dom::listen_id("robot-checkbox", "click", |_| on_checkbox())?;

    // Evasive "No" button
    if let Some(no_btn) = dom::by_id(NO_BUTTON) {
        for kind in ["mousedown", "click"] {
            dom::listen(&no_btn, kind, move |ev| on_no_activation(&ev, kind == "click"))?;
        }
        dom::listen_with_passive(&no_btn, "touchstart", false, |ev| on_no_activation(&ev, false))?;
    } else {
        tracing::warn!(id = NO_BUTTON, "element missing, feature disabled");
    }
    dom::listen(&doc, "mousemove", |ev| {
        if let Some(m) = ev.dyn_ref::<MouseEvent>() {
            on_pointer(Point::new(f64::from(m.client_x()), f64::from(m.client_y())));
        }
    })?;
    dom::listen_with_passive(&doc, "touchmove", true, |ev| {
        if let Some(p) = touch_point(&ev) {
            on_pointer(p);
        }
    })?;
    dom::listen(&win, "resize", |_| on_resize())?;

    // Puzzle controls
    dom::listen_id("verify-btn", "click", |_| on_verify())?;
    dom::listen_id("refresh-btn", "click", |_| on_refresh())?;
    dom::listen_id("audio-btn", "click", |_| {
        message(puzzle::AUDIO_UNAVAILABLE_MESSAGE, Tone::Error);
    })?;
    dom::listen_id("info-btn", "click", |_| message(puzzle::INFO_MESSAGE, Tone::Info))?;
    dom::listen(&doc, GRID_VERIFIED_EVENT, |_| on_grid_verified())?;

    // Keyboard + easter eggs
    dom::listen(&doc, "keydown", on_keydown)?;
    let hearts = doc.query_selector_all(".pixel-heart")?;
    for i in 0..hearts.length() {
        if let Some(heart) = hearts.get(i) {
            let el = heart.dyn_ref::<HtmlElement>().cloned();
            dom::listen(&heart, "click", move |_| on_heart(el.as_ref()))?;
        }
    }

    go_to(Screen::Intro);
    tracing::info!("valentine page ready");
    Ok(())
}

/// Name-based transition for host scripts; unknown names are ignored.
#[wasm_bindgen]
pub fn show_screen(name: &str) {
    match name.parse::<Screen>() {
        Ok(screen) => go_to(screen),
        Err(()) => tracing::debug!(name, "ignoring unknown screen"),
    }
}

// --- Screens -----------------------------------------------------------------

fn go_to(screen: Screen) {
    with_state(|st| show(st, screen));
}

fn show(st: &mut PageState, screen: Screen) {
    let change = st.screens.show(screen);
    for s in Screen::ALL {
        if let Some(el) = dom::by_id(s.element_id()) {
            dom::set_class(&el, "active", s == change.current);
            if s == change.current {
                dom::set_style(&el, "animation", "fadeIn 0.5s ease-out");
            }
        }
    }
    if let Some(home) = dom::by_id("home-btn") {
        dom::set_style(&home, "display", if change.home_visible { "flex" } else { "none" });
    }
    match screen {
        Screen::Question => reset_evasive(st),
        Screen::Puzzle => {
            st.puzzle.populate(&mut st.rng);
            render_grid(st);
        }
        _ => {}
    }
}

fn on_envelope() {
    overlay::cue(Cue::Click);
    if let Some(el) = dom::by_id("start-envelope") {
        dom::set_style(&el, "animation", "heartbeat 0.5s ease-out");
    }
    let delay = with_state(|st| st.cfg.flow.envelope_delay_ms).unwrap_or(0);
    timer::schedule(delay, || go_to(Screen::Question));
}

fn on_yes() {
    overlay::cue(Cue::Click);
    if let Some(el) = dom::by_id("yes-btn") {
        dom::set_style(&el, "animation", "popIn 0.3s ease-out");
    }
    let delay = with_state(|st| st.cfg.flow.yes_delay_ms).unwrap_or(0);
    timer::schedule(delay, || go_to(Screen::Verification));
}

fn on_home() {
    overlay::cue(Cue::Click);
    with_state(|st| {
        st.checkbox.reset();
        reset_checkbox_dom();
        st.puzzle.clear_selection();
        sync_tiles(st);
        update_verify_button(st);
        reset_evasive(st);
        show(st, Screen::Intro);
    });
}

fn on_grid_verified() {
    overlay::cue(Cue::Success);
    let delay = with_state(|st| st.cfg.flow.success_delay_ms).unwrap_or(0);
    timer::schedule(delay, || {
        go_to(Screen::Success);
        overlay::cue(Cue::Confetti);
    });
}

// --- Checkbox & loading -----------------------------------------------------

fn on_checkbox() {
    let Some(delay) = with_state(|st| {
        st.checkbox.check().then(|| {
            if let Some(el) = dom::by_id("checkbox") {
                dom::set_class(&el, "checked", true);
            }
            st.cfg.flow.checkbox_delay_ms
        })
    })
    .flatten() else {
        return;
    };
    overlay::cue(Cue::Click);
    timer::schedule(delay, || {
        let tick = with_state(|st| {
            show(st, Screen::Loading);
            st.cfg.flow.progress_tick_ms
        });
        if let Some(tick) = tick {
            timer::schedule(tick, progress_tick);
        }
    });
}

fn progress_tick() {
    let next = with_state(|st| {
        let progress = st.checkbox.tick();
        if let Some(fill) = dom::by_id("progress-fill") {
            dom::set_style(&fill, "width", &format!("{}%", st.checkbox.percent()));
        }
        match progress {
            Progress::Loading(_) => (false, st.cfg.flow.progress_tick_ms),
            Progress::Done => (true, st.cfg.flow.progress_done_delay_ms),
        }
    });
    match next {
        Some((false, tick)) => timer::schedule(tick, progress_tick),
        Some((true, delay)) => timer::schedule(delay, || {
            with_state(|st| {
                show(st, Screen::Puzzle);
                st.checkbox.reset();
                reset_checkbox_dom();
            });
        }),
        None => {}
    }
}

fn reset_checkbox_dom() {
    if let Some(el) = dom::by_id("checkbox") {
        dom::set_class(&el, "checked", false);
    }
    if let Some(fill) = dom::by_id("progress-fill") {
        dom::set_style(&fill, "width", "0%");
    }
}

// --- Evasive button ----------------------------------------------------------

fn on_pointer(p: Point) {
    let now = timer::now_ms();
    with_state(|st| {
        let Some(btn) = dom::by_id(NO_BUTTON) else {
            return;
        };
        let mv = st.evasive.pointer_moved(p, dom::rect_of(&btn), dom::viewport(), now, &mut st.rng);
        if let Some(mv) = mv {
            apply_move(&btn, mv);
        }
    });
}

fn on_no_activation(ev: &Event, clicked: bool) {
    ev.prevent_default();
    ev.stop_propagation();
    let pointer = if let Some(m) = ev.dyn_ref::<MouseEvent>() {
        Some(Point::new(f64::from(m.client_x()), f64::from(m.client_y())))
    } else {
        touch_point(ev)
    };
    with_state(|st| {
        let Some(btn) = dom::by_id(NO_BUTTON) else {
            return;
        };
        let mv = st.evasive.activation_attempt(pointer, dom::rect_of(&btn), dom::viewport(), &mut st.rng);
        if let Some(mv) = mv {
            apply_move(&btn, mv);
        }
    });
    if clicked {
        tracing::info!("no button clicked (somehow!)");
        overlay::cue(Cue::Error);
    }
}

fn on_resize() {
    with_state(|st| {
        if let (Some(mv), Some(btn)) = (st.evasive.resized(dom::viewport()), dom::by_id(NO_BUTTON)) {
            apply_move(&btn, mv);
        }
    });
}

fn apply_move(btn: &HtmlElement, mv: EvasionMove) {
    let to = match mv {
        EvasionMove::Arm { slot, to } => {
            insert_placeholder(btn, slot.width, slot.height);
            dom::set_style(btn, "position", "fixed");
            dom::set_style(btn, "left", &format!("{}px", slot.x));
            dom::set_style(btn, "top", &format!("{}px", slot.y));
            dom::set_style(btn, "margin", "0");
            dom::set_style(btn, "transition", "none");
            to
        }
        EvasionMove::Relocate { to } | EvasionMove::Clamp { to } => to,
    };
    dom::set_style(btn, "left", &format!("{}px", to.x));
    dom::set_style(btn, "top", &format!("{}px", to.y));
}

fn insert_placeholder(btn: &HtmlElement, width: f64, height: f64) {
    let (Some(doc), Some(parent)) = (dom::document(), btn.parent_node()) else {
        return;
    };
    let Some(ph) = doc.create_element("div").ok().and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    ph.set_class_name(PLACEHOLDER_CLASS);
    dom::set_style(&ph, "width", &format!("{width}px"));
    dom::set_style(&ph, "height", &format!("{height}px"));
    dom::set_style(&ph, "visibility", "hidden");
    let anchor: &web_sys::Node = btn;
    parent.insert_before(&ph, Some(anchor)).ok();
}

fn reset_evasive(st: &mut PageState) {
    if !st.evasive.reset() {
        return;
    }
    let Some(btn) = dom::by_id(NO_BUTTON) else {
        return;
    };
    for prop in ["position", "left", "top", "margin", "transition"] {
        dom::clear_style(&btn, prop);
    }
    if let Some(parent) = btn.parent_element() {
        if let Ok(Some(ph)) = parent.query_selector(&format!(".{PLACEHOLDER_CLASS}")) {
            ph.remove();
        }
    }
    tracing::debug!("evasive target reset");
}

fn touch_point(ev: &Event) -> Option<Point> {
    let t = ev.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(Point::new(f64::from(t.client_x()), f64::from(t.client_y())))
}

// --- Puzzle ------------------------------------------------------------------

fn render_grid(st: &mut PageState) {
    let (Some(doc), Some(grid)) = (dom::document(), dom::by_id("image-grid")) else {
        return;
    };
    grid.set_inner_html("");
    st.tile_listeners.clear();
    for item in st.puzzle.items() {
        let Some(tile) = doc.create_element("div").ok().and_then(|e| e.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        let index = item.id.index();
        tile.set_class_name("grid-item stagger-item");
        tile.set_attribute("data-index", &index.to_string()).ok();
        tile.set_attribute("data-correct", if item.correct { "true" } else { "false" }).ok();
        tile.set_attribute("data-src", &item.src).ok();

        if let Ok(img) = doc.create_element("img") {
            img.set_attribute("src", &item.src).ok();
            img.set_attribute("alt", &format!("Image {}", index + 1)).ok();
            tile.append_child(&img).ok();
        }
        if let Ok(mark) = doc.create_element("div") {
            mark.set_class_name("checkmark-overlay");
            mark.set_text_content(Some("✓"));
            tile.append_child(&mark).ok();
        }

        let id = item.id;
        let closure = Closure::wrap(Box::new(move |_: Event| on_tile(id)) as Box<dyn FnMut(Event)>);
        tile.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref()).ok();
        st.tile_listeners.push(closure);
        grid.append_child(&tile).ok();
    }
    if let Some(btn) = dom::by_id("verify-btn") {
        btn.set_text_content(Some(puzzle::VERIFY_LABEL));
        dom::clear_style(&btn, "background");
    }
    update_verify_button(st);
}

fn tile_element(id: ItemId) -> Option<HtmlElement> {
    let doc = dom::document()?;
    let selector = format!("#image-grid .grid-item[data-index=\"{}\"]", id.index());
    doc.query_selector(&selector).ok()??.dyn_into().ok()
}

fn on_tile(id: ItemId) {
    with_state(|st| {
        let Some(selected) = st.puzzle.toggle(id) else {
            return;
        };
        if let Some(tile) = tile_element(id) {
            dom::set_class(&tile, "selected", selected);
            dom::clear_style(&tile, "border");
            if selected {
                dom::set_style(&tile, "animation", "popIn 0.3s ease-out");
            }
        }
        update_verify_button(st);
    });
}

/// Mirror selection flags onto the tiles.
fn sync_tiles(st: &PageState) {
    for item in st.puzzle.items() {
        if let Some(tile) = tile_element(item.id) {
            dom::set_class(&tile, "selected", item.selected);
            if !item.flagged {
                dom::clear_style(&tile, "border");
            }
        }
    }
}

fn update_verify_button(st: &PageState) {
    let Some(btn) = dom::by_id("verify-btn") else {
        return;
    };
    let enabled = st.puzzle.can_submit();
    if let Some(b) = btn.dyn_ref::<web_sys::HtmlButtonElement>() {
        b.set_disabled(!enabled);
    }
    dom::set_class(&btn, "animate-pulse", enabled || st.puzzle.is_verifying());
}

fn on_verify() {
    let outcome = with_state(|st| {
        let outcome = st.puzzle.submit()?;
        match &outcome {
            Err(VerifyError::IncorrectSelection { wrong }) => {
                for id in wrong {
                    if let Some(tile) = tile_element(*id) {
                        dom::set_style(&tile, "border", "4px solid #ff0000");
                    }
                }
            }
            Err(_) => {}
            Ok(_) => {
                if let Some(btn) = dom::by_id("verify-btn") {
                    btn.set_text_content(Some(puzzle::VERIFYING_LABEL));
                }
                update_verify_button(st);
            }
        }
        let p = &st.cfg.puzzle;
        let delays = (p.flag_interval_ms, p.verify_delay_ms, p.success_pause_ms);
        Some((outcome, delays, st.cfg.flow.clone()))
    })
    .flatten();
    let Some((outcome, (flag_interval, verify_delay, pause), flow)) = outcome else {
        return;
    };

    match outcome {
        Err(err) => {
            toast_for(&err, flow.message_duration_ms, flow.fade_ms);
            if let VerifyError::IncorrectSelection { wrong } = err {
                timer::schedule(flag_interval, move || {
                    with_state(|st| {
                        for id in &wrong {
                            if let Some(tile) = tile_element(*id) {
                                dom::clear_style(&tile, "border");
                            }
                        }
                        st.puzzle.clear_flagged(&wrong);
                        sync_tiles(st);
                        update_verify_button(st);
                    });
                });
            }
        }
        Ok(_) => {
            timer::schedule(verify_delay, move || {
                with_state(|st| {
                    if let Some(btn) = dom::by_id("verify-btn") {
                        btn.set_text_content(Some(puzzle::SUCCESS_LABEL));
                        dom::set_style(&btn, "background", "#32cd32");
                    }
                    for item in st.puzzle.items().iter().filter(|i| i.selected) {
                        if let Some(tile) = tile_element(item.id) {
                            dom::set_style(&tile, "animation", "heartbeat 0.5s ease-out");
                        }
                    }
                });
                timer::schedule(pause, || {
                    if with_state(|st| st.puzzle.complete()).unwrap_or(false) {
                        if let Some(doc) = dom::document() {
                            if let Ok(ev) = Event::new(GRID_VERIFIED_EVENT) {
                                doc.dispatch_event(&ev).ok();
                            }
                        }
                    }
                });
            });
        }
    }
}

fn toast_for(err: &VerifyError, duration_ms: u32, fade_ms: u32) {
    tracing::info!(%err, "submission rejected");
    overlay::toast(&err.to_string(), Tone::Error, duration_ms, fade_ms);
}

fn on_refresh() {
    with_state(|st| {
        if !st.puzzle.refresh(&mut st.rng) {
            return;
        }
        render_grid(st);
        if let Some(grid) = dom::by_id("image-grid") {
            dom::set_style(&grid, "animation", "spin 0.5s ease-out");
        }
    });
}

fn message(text: &str, tone: Tone) {
    let timing = with_state(|st| (st.cfg.flow.message_duration_ms, st.cfg.flow.fade_ms));
    let (duration, fade) = timing.unwrap_or((3000, 300));
    overlay::toast(text, tone, duration, fade);
}

// --- Keyboard & easter eggs --------------------------------------------------

fn on_keydown(ev: Event) {
    let Some(key) = ev.dyn_ref::<web_sys::KeyboardEvent>().map(|k| k.key()) else {
        return;
    };
    let actions = with_state(|st| {
        let screen = st.screens.current();
        st.keys.key(&key, screen)
    })
    .unwrap_or_default();
    for action in actions {
        match action {
            KeyAction::PressYes => on_yes(),
            KeyAction::PressCheckbox => {
                ev.prevent_default();
                on_checkbox();
            }
            KeyAction::Konami => {
                overlay::cue(Cue::Confetti);
                show_modal(KONAMI_MESSAGE);
            }
            KeyAction::Love => tracing::info!("L is for LOVE"),
        }
    }
}

fn on_heart(el: Option<&HtmlElement>) {
    if let Some(el) = el {
        dom::set_style(el, "animation", "heartbeat 0.5s ease-out");
    }
    if with_state(|st| st.hearts.click()).unwrap_or(false) {
        show_modal(HEARTS_MESSAGE);
        overlay::cue(Cue::Confetti);
    }
}

fn show_modal(text: &str) {
    let fade = with_state(|st| st.cfg.flow.fade_ms).unwrap_or(300);
    overlay::modal(text, fade);
}
