//! Screen controller: which full-viewport screen is active.

use std::fmt;
use std::str::FromStr;

/// One full-viewport state of the narrative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Intro,
    Question,
    Verification,
    Loading,
    Puzzle,
    Success,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Intro,
        Screen::Question,
        Screen::Verification,
        Screen::Loading,
        Screen::Puzzle,
        Screen::Success,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Screen::Intro => "intro",
            Screen::Question => "question",
            Screen::Verification => "verification",
            Screen::Loading => "loading",
            Screen::Puzzle => "puzzle",
            Screen::Success => "success",
        }
    }

    /// Id of the screen's container element.
    pub fn element_id(self) -> &'static str {
        match self {
            Screen::Intro => "screen-intro",
            Screen::Question => "screen-question",
            Screen::Verification => "screen-verification",
            Screen::Loading => "screen-loading",
            Screen::Puzzle => "screen-puzzle",
            Screen::Success => "screen-success",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Screen {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL.into_iter().find(|sc| sc.name() == s).ok_or(())
    }
}

/// Presentational diff produced by a transition; the DOM layer applies it verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenChange {
    pub previous: Screen,
    pub current: Screen,
    /// The home control is hidden only on the intro screen.
    pub home_visible: bool,
}

/// Owns the current screen.
#[derive(Debug)]
pub struct ScreenController {
    current: Screen,
}

impl Default for ScreenController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenController {
    pub fn new() -> Self {
        Self { current: Screen::Intro }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn is_active(&self, screen: Screen) -> bool {
        self.current == screen
    }

    /// Activate `screen`, deactivating every other one. Re-showing the active screen still
    /// yields a change so hosts can replay entry effects.
    pub fn show(&mut self, screen: Screen) -> ScreenChange {
        let previous = self.current;
        self.current = screen;
        tracing::info!(from = previous.name(), to = screen.name(), "screen change");
        ScreenChange { previous, current: screen, home_visible: screen != Screen::Intro }
    }

    /// Name-based variant; unknown names are ignored.
    pub fn show_named(&mut self, name: &str) -> Option<ScreenChange> {
        match name.parse::<Screen>() {
            Ok(screen) => Some(self.show(screen)),
            Err(()) => {
                tracing::debug!(name, "ignoring unknown screen");
                None
            }
        }
    }
}
