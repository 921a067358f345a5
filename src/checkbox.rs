//! "I'm not a robot" checkbox followed by a fake loading bar.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Still loading; current percentage.
    Loading(u32),
    /// Reached 100 %. Reported once; later ticks keep returning `Done`.
    Done,
}

#[derive(Debug)]
pub struct CheckboxFlow {
    checked: bool,
    percent: u32,
    step: u32,
}

impl CheckboxFlow {
    pub fn new(step_percent: u32) -> Self {
        Self { checked: false, percent: 0, step: step_percent.max(1) }
    }

    /// Check the box. Returns `false` if it was already checked (the click is ignored).
    pub fn check(&mut self) -> bool {
        if self.checked {
            return false;
        }
        self.checked = true;
        self.percent = 0;
        true
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Advance the bar by one step.
    pub fn tick(&mut self) -> Progress {
        self.percent = (self.percent + self.step).min(100);
        if self.percent >= 100 { Progress::Done } else { Progress::Loading(self.percent) }
    }

    pub fn reset(&mut self) {
        self.checked = false;
        self.percent = 0;
    }
}
