//! Easter eggs and keyboard shortcuts.

use std::collections::VecDeque;

use crate::screen::Screen;

pub const KONAMI_MESSAGE: &str = "🎮 Konami Code Activated! You found the secret! 💕✨";
pub const HEARTS_MESSAGE: &str = "💕 You really love clicking hearts! Here's some confetti! 💕";

const KONAMI: [&str; 10] = [
    "arrowup", "arrowup", "arrowdown", "arrowdown", "arrowleft", "arrowright", "arrowleft",
    "arrowright", "b", "a",
];

/// What a key press should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Behave as if the "Yes" button was clicked.
    PressYes,
    /// Behave as if the checkbox was clicked (default must be prevented).
    PressCheckbox,
    /// Konami code completed.
    Konami,
    /// `L` for love; only logged.
    Love,
}

/// Keeps the last ten keys and maps presses to shortcuts.
#[derive(Debug, Default)]
pub struct KeyWatcher {
    recent: VecDeque<String>,
}

impl KeyWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one `KeyboardEvent.key`. Several actions can fire for the same key
    /// (a trailing `a` completes the code on any screen).
    pub fn key(&mut self, key: &str, screen: Screen) -> Vec<KeyAction> {
        let mut actions = Vec::new();
        match (key, screen) {
            ("Enter", Screen::Question) => actions.push(KeyAction::PressYes),
            (" ", Screen::Verification) => actions.push(KeyAction::PressCheckbox),
            ("l" | "L", _) => actions.push(KeyAction::Love),
            _ => {}
        }

        self.recent.push_back(key.to_ascii_lowercase());
        if self.recent.len() > KONAMI.len() {
            self.recent.pop_front();
        }
        if self.recent.iter().map(String::as_str).eq(KONAMI) {
            actions.push(KeyAction::Konami);
        }
        actions
    }
}

/// Counts clicks on decorative hearts; every `threshold`th click pays out.
#[derive(Debug)]
pub struct HeartCounter {
    clicks: u32,
    threshold: u32,
}

impl HeartCounter {
    pub fn new(threshold: u32) -> Self {
        Self { clicks: 0, threshold: threshold.max(1) }
    }

    /// Returns `true` when this click reaches the threshold; the counter then starts over.
    pub fn click(&mut self) -> bool {
        self.clicks += 1;
        if self.clicks == self.threshold {
            self.clicks = 0;
            return true;
        }
        false
    }
}
