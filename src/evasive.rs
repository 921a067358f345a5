//! Evasive target: an element that jumps away whenever the pointer gets close.
//!
//! State machine: `Dormant` (element sits in normal layout) → `Armed` on the first proximity hit
//! or activation attempt (element switches to viewport-fixed coordinates, its slot backfilled by a
//! same-size placeholder) → repositioned on every later hit. `reset` puts it back to `Dormant`
//! whenever its hosting screen is shown again.
//!
//! Proximity is sampled on pointer-move events only, so a fast enough pointer can land inside
//! the detection radius between two samples. Evasion is best-effort.

use crate::config::EvasionConfig;
use crate::rng::RandomSource;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned box in viewport coordinates (`x`/`y` = top-left).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Hidden elements report a zero-sized box.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Dormant,
    Armed,
}

/// What the DOM layer has to do after an event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EvasionMove {
    /// Insert a placeholder the size of `slot`, switch to fixed positioning, then jump to `to`.
    Arm { slot: Rect, to: Point },
    /// Jump to `to` (no transition).
    Relocate { to: Point },
    /// Resize clamp; same as `Relocate` but not a reposition.
    Clamp { to: Point },
}

/// Outcome of one reposition search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// New top-left corner.
    pub at: Point,
    /// Candidates sampled, `1..=max_attempts`.
    pub attempts: u32,
    /// Distance between pointer and the new center.
    pub distance: f64,
}

/// Sample up to `max_attempts` top-left corners uniformly in the viewport minus margins and the
/// element's size; keep the first whose center is farther than `min_safe_distance` from the
/// pointer, else the last one sampled.
pub fn pick_position(
    pointer: Point,
    width: f64,
    height: f64,
    viewport: Viewport,
    cfg: &EvasionConfig,
    rng: &mut dyn RandomSource,
) -> Placement {
    let min_x = cfg.edge_margin;
    let min_y = cfg.edge_margin;
    let max_x = viewport.width - width - cfg.edge_margin;
    let max_y = viewport.height - height - cfg.edge_margin;
    let max_attempts = cfg.max_attempts.max(1);

    let mut placement = Placement { at: Point::new(min_x, min_y), attempts: 0, distance: 0.0 };
    for attempt in 1..=max_attempts {
        let at = Point::new(
            min_x + rng.next_f64() * (max_x - min_x),
            min_y + rng.next_f64() * (max_y - min_y),
        );
        let distance = pointer.distance(Rect::new(at.x, at.y, width, height).center());
        placement = Placement { at, attempts: attempt, distance };
        if distance > cfg.min_safe_distance {
            break;
        }
    }
    placement
}

pub struct EvasiveTarget {
    cfg: EvasionConfig,
    phase: Phase,
    /// Fixed-position box; meaningful only while armed.
    rect: Rect,
    pointer: Point,
    last_move_ms: f64,
}

impl EvasiveTarget {
    pub fn new(cfg: EvasionConfig) -> Self {
        Self {
            cfg,
            phase: Phase::Dormant,
            rect: Rect::default(),
            pointer: Point::default(),
            last_move_ms: f64::NEG_INFINITY,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current fixed-position box, `None` while dormant.
    pub fn rect(&self) -> Option<Rect> {
        match self.phase {
            Phase::Armed => Some(self.rect),
            Phase::Dormant => None,
        }
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Pointer or touch moved to `pointer`. `layout` is the element's current bounding box; an
    /// empty box means the hosting screen is hidden and nothing happens.
    pub fn pointer_moved(
        &mut self,
        pointer: Point,
        layout: Rect,
        viewport: Viewport,
        now_ms: f64,
        rng: &mut dyn RandomSource,
    ) -> Option<EvasionMove> {
        self.pointer = pointer;
        match self.phase {
            Phase::Dormant => {
                if layout.is_empty() || pointer.distance(layout.center()) >= self.cfg.detection_radius
                {
                    return None;
                }
                tracing::debug!("first approach, arming evasive target");
                self.last_move_ms = now_ms;
                Some(self.arm(layout, viewport, rng))
            }
            Phase::Armed => {
                if layout.is_empty()
                    || self.rect.is_empty()
                    || pointer.distance(self.rect.center()) >= self.cfg.detection_radius
                    || now_ms - self.last_move_ms <= self.cfg.cooldown_ms
                {
                    return None;
                }
                self.last_move_ms = now_ms;
                Some(EvasionMove::Relocate { to: self.reposition(viewport, rng) })
            }
        }
    }

    /// Press, click or touch-start on the element. The caller must prevent the default action;
    /// the element always moves away, bypassing the cooldown.
    pub fn activation_attempt(
        &mut self,
        pointer: Option<Point>,
        layout: Rect,
        viewport: Viewport,
        rng: &mut dyn RandomSource,
    ) -> Option<EvasionMove> {
        if let Some(p) = pointer {
            self.pointer = p;
        }
        match self.phase {
            Phase::Dormant if layout.is_empty() => None,
            Phase::Dormant => Some(self.arm(layout, viewport, rng)),
            Phase::Armed => Some(EvasionMove::Relocate { to: self.reposition(viewport, rng) }),
        }
    }

    /// Viewport resized: pull the element back inside the margins without a new search.
    pub fn resized(&mut self, viewport: Viewport) -> Option<EvasionMove> {
        if self.phase != Phase::Armed {
            return None;
        }
        let m = self.cfg.edge_margin;
        let r = &mut self.rect;
        if r.x + r.width > viewport.width - m {
            r.x = viewport.width - r.width - m;
        }
        if r.y + r.height > viewport.height - m {
            r.y = viewport.height - r.height - m;
        }
        r.x = r.x.max(m);
        r.y = r.y.max(m);
        Some(EvasionMove::Clamp { to: Point::new(r.x, r.y) })
    }

    /// Back to `Dormant`. Returns whether the element was armed, i.e. whether a placeholder and
    /// fixed positioning have to be undone.
    pub fn reset(&mut self) -> bool {
        let was_armed = self.phase == Phase::Armed;
        self.phase = Phase::Dormant;
        self.rect = Rect::default();
        self.last_move_ms = f64::NEG_INFINITY;
        was_armed
    }

    fn arm(&mut self, layout: Rect, viewport: Viewport, rng: &mut dyn RandomSource) -> EvasionMove {
        self.phase = Phase::Armed;
        self.rect = layout;
        let to = self.reposition(viewport, rng);
        EvasionMove::Arm { slot: layout, to }
    }

    fn reposition(&mut self, viewport: Viewport, rng: &mut dyn RandomSource) -> Point {
        let placement =
            pick_position(self.pointer, self.rect.width, self.rect.height, viewport, &self.cfg, rng);
        self.rect.x = placement.at.x;
        self.rect.y = placement.at.y;
        tracing::debug!(
            x = placement.at.x,
            y = placement.at.y,
            distance = placement.distance,
            attempts = placement.attempts,
            "evasive target moved"
        );
        placement.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    const VP: Viewport = Viewport { width: 1000.0, height: 800.0 };

    fn button() -> Rect {
        Rect::new(450.0, 380.0, 100.0, 40.0)
    }

    #[test]
    fn far_pointer_keeps_target_dormant() {
        let mut t = EvasiveTarget::new(EvasionConfig::default());
        let mut rng = ScriptedRandom::new([0.0]);
        assert_eq!(t.pointer_moved(Point::new(10.0, 10.0), button(), VP, 0.0, &mut rng), None);
        assert_eq!(t.phase(), Phase::Dormant);
    }

    #[test]
    fn first_approach_arms_and_jumps() {
        let mut t = EvasiveTarget::new(EvasionConfig::default());
        // candidate (50, 50): center (100, 70), far from the pointer at the button center
        let mut rng = ScriptedRandom::new([0.0]);
        let mv = t.pointer_moved(button().center(), button(), VP, 0.0, &mut rng);
        assert_eq!(mv, Some(EvasionMove::Arm { slot: button(), to: Point::new(50.0, 50.0) }));
        assert_eq!(t.phase(), Phase::Armed);
        assert_eq!(t.rect(), Some(Rect::new(50.0, 50.0, 100.0, 40.0)));
    }

    #[test]
    fn hidden_target_never_arms() {
        let mut t = EvasiveTarget::new(EvasionConfig::default());
        let mut rng = ScriptedRandom::new([0.5]);
        let hidden = Rect::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(t.pointer_moved(Point::default(), hidden, VP, 0.0, &mut rng), None);
        assert_eq!(t.activation_attempt(None, hidden, VP, &mut rng), None);
    }

    #[test]
    fn cooldown_throttles_moves() {
        let mut t = EvasiveTarget::new(EvasionConfig::default());
        let mut rng = ScriptedRandom::new([0.0]);
        t.pointer_moved(button().center(), button(), VP, 1000.0, &mut rng);
        let near = Point::new(100.0, 70.0);
        assert_eq!(t.pointer_moved(near, button(), VP, 1030.0, &mut rng), None);
        assert_eq!(t.pointer_moved(near, button(), VP, 1050.0, &mut rng), None);
        assert!(matches!(
            t.pointer_moved(near, button(), VP, 1051.0, &mut rng),
            Some(EvasionMove::Relocate { .. })
        ));
    }

    #[test]
    fn search_accepts_first_safe_candidate() {
        let cfg = EvasionConfig::default();
        // first candidate lands on the pointer, second one in the far corner
        let mut rng = ScriptedRandom::new([0.5, 0.5, 1.0, 1.0]);
        let vp = Viewport { width: 1000.0, height: 1000.0 };
        let p = pick_position(Point::new(500.0, 500.0), 100.0, 100.0, vp, &cfg, &mut rng);
        assert_eq!(p.attempts, 2);
        assert!(p.distance > cfg.min_safe_distance);
    }

    #[test]
    fn search_falls_back_to_last_candidate() {
        let cfg = EvasionConfig::default();
        let mut rng = ScriptedRandom::new([0.5]);
        let vp = Viewport { width: 1000.0, height: 1000.0 };
        let p = pick_position(Point::new(500.0, 500.0), 100.0, 100.0, vp, &cfg, &mut rng);
        assert_eq!(p.attempts, 20);
        assert_eq!(p.at, Point::new(450.0, 450.0));
        assert_eq!(p.distance, 0.0);
    }

    #[test]
    fn activation_attempt_always_moves() {
        let mut t = EvasiveTarget::new(EvasionConfig::default());
        let mut rng = ScriptedRandom::new([0.9, 0.1]);
        let first = t.activation_attempt(Some(button().center()), button(), VP, &mut rng);
        assert!(matches!(first, Some(EvasionMove::Arm { .. })));
        let second = t.activation_attempt(None, button(), VP, &mut rng);
        assert!(matches!(second, Some(EvasionMove::Relocate { .. })));
    }

    #[test]
    fn resize_clamps_inside_margins() {
        let mut t = EvasiveTarget::new(EvasionConfig::default());
        let mut rng = ScriptedRandom::new([0.999_999]);
        t.activation_attempt(Some(Point::new(0.0, 0.0)), button(), VP, &mut rng);
        let small = Viewport { width: 400.0, height: 300.0 };
        assert_eq!(t.resized(small), Some(EvasionMove::Clamp { to: Point::new(250.0, 210.0) }));
    }

    #[test]
    fn resize_ignored_while_dormant() {
        let mut t = EvasiveTarget::new(EvasionConfig::default());
        assert_eq!(t.resized(VP), None);
    }

    #[test]
    fn reset_returns_to_dormant() {
        let mut t = EvasiveTarget::new(EvasionConfig::default());
        let mut rng = ScriptedRandom::new([0.0]);
        t.activation_attempt(None, button(), VP, &mut rng);
        assert!(t.reset());
        assert_eq!(t.phase(), Phase::Dormant);
        assert!(!t.reset());
        // next approach arms again immediately, cooldown included
        assert!(matches!(
            t.pointer_moved(button().center(), button(), VP, 0.0, &mut rng),
            Some(EvasionMove::Arm { .. })
        ));
    }
}
