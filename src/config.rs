//! Page configuration.
//!
//! Every timing, distance and image list the page uses lives here. `PageConfig::default()` is the
//! stock Valentine page; hosts can override any subset through JSON when the `serde_json`
//! feature is on (missing keys fall back to the defaults).

use crate::error::PageError;

/// Evasion tuning (logical pixels / milliseconds).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvasionConfig {
    /// Pointer closer than this to the element's center triggers a move.
    pub detection_radius: f64,
    /// Preferred minimum distance between pointer and the new center.
    pub min_safe_distance: f64,
    /// Margin kept from every viewport edge.
    pub edge_margin: f64,
    /// Minimum time between two proximity-driven moves.
    pub cooldown_ms: f64,
    /// Candidate positions sampled before settling for the last one.
    pub max_attempts: u32,
}

impl Default for EvasionConfig {
    fn default() -> Self {
        Self {
            detection_radius: 100.0,
            min_safe_distance: 250.0,
            edge_margin: 50.0,
            cooldown_ms: 50.0,
            max_attempts: 20,
        }
    }
}

/// Image sets and delays of the verification puzzle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PuzzleConfig {
    pub correct_images: Vec<String>,
    pub decoy_images: Vec<String>,
    /// How long wrongly selected tiles stay highlighted before being deselected.
    pub flag_interval_ms: u32,
    /// "Verifying..." phase after an accepted submit.
    pub verify_delay_ms: u32,
    /// "Success!" phase before the completion signal is raised.
    pub success_pause_ms: u32,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            correct_images: (1..=6).map(|i| format!("assets/grid/correct{i}.jpg")).collect(),
            decoy_images: (1..=3).map(|i| format!("assets/grid/wrong{i}.jpg")).collect(),
            flag_interval_ms: 1500,
            verify_delay_ms: 1000,
            success_pause_ms: 1500,
        }
    }
}

/// Narrative delays between screens and of the checkbox/loading flow.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlowConfig {
    pub envelope_delay_ms: u32,
    pub yes_delay_ms: u32,
    pub success_delay_ms: u32,
    pub checkbox_delay_ms: u32,
    pub progress_step_percent: u32,
    pub progress_tick_ms: u32,
    pub progress_done_delay_ms: u32,
    pub message_duration_ms: u32,
    pub fade_ms: u32,
    pub heart_clicks_for_confetti: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            envelope_delay_ms: 500,
            yes_delay_ms: 300,
            success_delay_ms: 500,
            checkbox_delay_ms: 800,
            progress_step_percent: 5,
            progress_tick_ms: 80,
            progress_done_delay_ms: 500,
            message_duration_ms: 3000,
            fade_ms: 300,
            heart_clicks_for_confetti: 10,
        }
    }
}

/// Whole-page configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageConfig {
    pub evasion: EvasionConfig,
    pub puzzle: PuzzleConfig,
    pub flow: FlowConfig,
    /// One of `trace`, `debug`, `info`, `warn`, `error`, `off`.
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            evasion: EvasionConfig::default(),
            puzzle: PuzzleConfig::default(),
            flow: FlowConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl PageConfig {
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        let cfg: PageConfig =
            serde_json::from_str(json).map_err(|e| PageError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PageError> {
        let ev = &self.evasion;
        if !(ev.detection_radius > 0.0) || !(ev.min_safe_distance > 0.0) {
            return Err(PageError::Config("evasion distances must be positive".into()));
        }
        if ev.edge_margin < 0.0 || ev.cooldown_ms < 0.0 {
            return Err(PageError::Config("margin and cooldown must not be negative".into()));
        }
        if ev.max_attempts == 0 {
            return Err(PageError::Config("max_attempts must be at least 1".into()));
        }
        if self.puzzle.correct_images.is_empty() {
            return Err(PageError::Config("puzzle needs at least one correct image".into()));
        }
        if self.flow.progress_step_percent == 0 {
            return Err(PageError::Config("progress_step_percent must be at least 1".into()));
        }
        if crate::logging::parse_level(&self.log_level).is_none() {
            return Err(PageError::Config(format!("unknown log level '{}'", self.log_level)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = PageConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.puzzle.correct_images.len(), 6);
        assert_eq!(cfg.puzzle.decoy_images.len(), 3);
        assert_eq!(cfg.evasion.max_attempts, 20);
    }

    #[test]
    fn validate_rejects_empty_correct_set() {
        let mut cfg = PageConfig::default();
        cfg.puzzle.correct_images.clear();
        assert!(matches!(cfg.validate(), Err(PageError::Config(_))));
    }

    #[test]
    fn validate_rejects_unknown_level() {
        let cfg = PageConfig { log_level: "loud".into(), ..PageConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_overrides_merge_with_defaults() {
        let cfg = PageConfig::from_json(
            r#"{ "evasion": { "detection_radius": 80.0 }, "log_level": "debug" }"#,
        )
        .unwrap();
        assert_eq!(cfg.evasion.detection_radius, 80.0);
        assert_eq!(cfg.evasion.min_safe_distance, 250.0);
        assert_eq!(cfg.puzzle, PuzzleConfig::default());
        assert_eq!(cfg.log_level, "debug");
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_rejects_garbage() {
        assert!(PageConfig::from_json("{ nope").is_err());
    }
}
