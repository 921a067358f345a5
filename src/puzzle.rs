//! Image-selection "verification" puzzle.
//!
//! A grid of correct images and decoys, shuffled on every population. The user toggles tiles and
//! submits; a submission is accepted only when every correct tile and no decoy is selected.

use crate::config::PuzzleConfig;
use crate::error::VerifyError;
use crate::rng::{self, RandomSource};

pub const INFO_MESSAGE: &str = "Select ALL images with your valentine! 💕";
pub const AUDIO_UNAVAILABLE_MESSAGE: &str = "Audio challenge not available 🎧";
pub const VERIFY_LABEL: &str = "Verify";
pub const VERIFYING_LABEL: &str = "Verifying...";
pub const SUCCESS_LABEL: &str = "Success! ✓";

/// Identity of one tile within one population. Ids from an earlier population never match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemId {
    generation: u32,
    index: usize,
}

impl ItemId {
    /// Grid position.
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridItem {
    pub id: ItemId,
    pub src: String,
    pub correct: bool,
    pub selected: bool,
    /// Wrongly selected and currently highlighted; cleared by `clear_flagged`.
    pub flagged: bool,
}

/// Accepted submission. The completion signal follows via [`VerificationPuzzle::complete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Acceptance {
    pub selected: usize,
}

pub struct VerificationPuzzle {
    correct_images: Vec<String>,
    decoy_images: Vec<String>,
    items: Vec<GridItem>,
    generation: u32,
    selected_count: usize,
    verifying: bool,
    completion_pending: bool,
}

impl VerificationPuzzle {
    pub fn new(cfg: &PuzzleConfig) -> Self {
        Self {
            correct_images: cfg.correct_images.clone(),
            decoy_images: cfg.decoy_images.clone(),
            items: Vec::new(),
            generation: 0,
            selected_count: 0,
            verifying: false,
            completion_pending: false,
        }
    }

    /// Shuffle correct images and decoys into a fresh grid. Previous item ids become stale.
    pub fn populate(&mut self, rng: &mut dyn RandomSource) {
        let mut pool: Vec<(&String, bool)> = self
            .correct_images
            .iter()
            .map(|s| (s, true))
            .chain(self.decoy_images.iter().map(|s| (s, false)))
            .collect();
        rng::shuffle(&mut pool, rng);

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.items = pool
            .into_iter()
            .enumerate()
            .map(|(index, (src, correct))| GridItem {
                id: ItemId { generation, index },
                src: src.clone(),
                correct,
                selected: false,
                flagged: false,
            })
            .collect();
        self.selected_count = 0;
        self.verifying = false;
        tracing::debug!(generation, tiles = self.items.len(), "grid populated");
    }

    /// Clear selections and reshuffle. Ignored (returns `false`) while a verification is pending.
    pub fn refresh(&mut self, rng: &mut dyn RandomSource) -> bool {
        if self.verifying {
            return false;
        }
        self.populate(rng);
        true
    }

    /// Flip a tile's selection. Returns the new state, or `None` for stale ids or while locked.
    pub fn toggle(&mut self, id: ItemId) -> Option<bool> {
        if self.verifying {
            return None;
        }
        let item = self.item_mut(id)?;
        item.selected = !item.selected;
        item.flagged = false;
        let selected = item.selected;
        if selected {
            self.selected_count += 1;
        } else {
            self.selected_count -= 1;
        }
        Some(selected)
    }

    /// Validate the current selection. `None` while a previous acceptance is still verifying.
    pub fn submit(&mut self) -> Option<Result<Acceptance, VerifyError>> {
        if self.verifying {
            return None;
        }
        if self.selected_count == 0 {
            return Some(Err(VerifyError::NoSelection));
        }

        let mut wrong = Vec::new();
        let mut selected_correct = 0;
        for item in self.items.iter_mut().filter(|i| i.selected) {
            if item.correct {
                selected_correct += 1;
            } else {
                item.flagged = true;
                wrong.push(item.id);
            }
        }
        if !wrong.is_empty() {
            return Some(Err(VerifyError::IncorrectSelection { wrong }));
        }

        let total = self.total_correct();
        if selected_correct < total {
            return Some(Err(VerifyError::IncompleteSelection { missed: total - selected_correct }));
        }

        self.verifying = true;
        self.completion_pending = true;
        tracing::info!(selected = selected_correct, "puzzle accepted");
        Some(Ok(Acceptance { selected: selected_correct }))
    }

    /// End of the highlight interval: deselect the given tiles if they are still flagged.
    /// Ids from an earlier population are ignored. Returns how many tiles were deselected.
    pub fn clear_flagged(&mut self, ids: &[ItemId]) -> usize {
        let mut cleared = 0;
        for &id in ids {
            if let Some(item) = self.item_mut(id) {
                if item.flagged {
                    item.flagged = false;
                    item.selected = false;
                    cleared += 1;
                }
            }
        }
        self.selected_count -= cleared;
        cleared
    }

    /// Take the completion signal of the last acceptance. `true` exactly once per acceptance.
    pub fn complete(&mut self) -> bool {
        std::mem::take(&mut self.completion_pending)
    }

    /// Deselect everything (return-to-start).
    pub fn clear_selection(&mut self) {
        for item in &mut self.items {
            item.selected = false;
            item.flagged = false;
        }
        self.selected_count = 0;
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&GridItem> {
        self.items.get(id.index).filter(|i| i.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut GridItem> {
        self.items.get_mut(id.index).filter(|i| i.id == id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected_count
    }

    pub fn total_correct(&self) -> usize {
        self.items.iter().filter(|i| i.correct).count()
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying
    }

    /// The verify control is enabled only with something selected.
    pub fn can_submit(&self) -> bool {
        !self.verifying && self.selected_count > 0
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    fn puzzle() -> VerificationPuzzle {
        let mut p = VerificationPuzzle::new(&PuzzleConfig::default());
        p.populate(&mut ScriptedRandom::new([0.3, 0.7, 0.1, 0.9, 0.5]));
        p
    }

    fn ids(p: &VerificationPuzzle, correct: bool) -> Vec<ItemId> {
        p.items().iter().filter(|i| i.correct == correct).map(|i| i.id).collect()
    }

    #[test]
    fn populate_builds_nine_tiles() {
        let p = puzzle();
        assert_eq!(p.items().len(), 9);
        assert_eq!(p.total_correct(), 6);
        for (pos, item) in p.items().iter().enumerate() {
            assert_eq!(item.id.index(), pos);
            assert_eq!(item.correct, item.src.contains("correct"));
        }
    }

    #[test]
    fn empty_submit_is_rejected() {
        let mut p = puzzle();
        assert_eq!(p.submit(), Some(Err(VerifyError::NoSelection)));
        assert!(!p.can_submit());
    }

    #[test]
    fn toggle_tracks_count() {
        let mut p = puzzle();
        let id = p.items()[0].id;
        assert_eq!(p.toggle(id), Some(true));
        assert_eq!(p.selected_count(), 1);
        assert_eq!(p.toggle(id), Some(false));
        assert_eq!(p.selected_count(), 0);
    }

    #[test]
    fn incomplete_leaves_selection() {
        let mut p = puzzle();
        let correct = ids(&p, true);
        for id in &correct[..4] {
            p.toggle(*id);
        }
        assert_eq!(p.submit(), Some(Err(VerifyError::IncompleteSelection { missed: 2 })));
        assert_eq!(p.selected_count(), 4);
    }

    #[test]
    fn decoy_flags_and_clears_only_decoys() {
        let mut p = puzzle();
        let c1 = ids(&p, true)[0];
        let w1 = ids(&p, false)[0];
        p.toggle(c1);
        p.toggle(w1);
        let Some(Err(VerifyError::IncorrectSelection { wrong })) = p.submit() else {
            panic!("expected incorrect selection");
        };
        assert_eq!(wrong, vec![w1]);
        assert!(p.item(w1).unwrap().flagged);
        assert_eq!(p.clear_flagged(&wrong), 1);
        assert!(!p.item(w1).unwrap().selected);
        assert!(p.item(c1).unwrap().selected);
        assert_eq!(p.selected_count(), 1);
    }

    #[test]
    fn manual_deselect_during_highlight_is_not_double_counted() {
        let mut p = puzzle();
        let w1 = ids(&p, false)[0];
        p.toggle(w1);
        let Some(Err(VerifyError::IncorrectSelection { wrong })) = p.submit() else {
            panic!("expected incorrect selection");
        };
        p.toggle(w1);
        assert_eq!(p.clear_flagged(&wrong), 0);
        assert_eq!(p.selected_count(), 0);
    }

    #[test]
    fn acceptance_locks_and_completes_once() {
        let mut p = puzzle();
        for id in ids(&p, true) {
            p.toggle(id);
        }
        assert_eq!(p.submit(), Some(Ok(Acceptance { selected: 6 })));
        assert!(p.is_verifying());
        assert_eq!(p.submit(), None);
        assert_eq!(p.toggle(p.items()[0].id), None);
        assert!(p.complete());
        assert!(!p.complete());
    }

    #[test]
    fn refresh_invalidates_old_ids() {
        let mut p = puzzle();
        let old = p.items()[0].id;
        p.toggle(old);
        assert!(p.refresh(&mut ScriptedRandom::new([0.2])));
        assert_eq!(p.selected_count(), 0);
        assert_eq!(p.toggle(old), None);
        assert_eq!(p.clear_flagged(&[old]), 0);
        assert!(p.items().iter().all(|i| !i.selected));
    }

    #[test]
    fn refresh_ignored_while_verifying() {
        let mut p = puzzle();
        for id in ids(&p, true) {
            p.toggle(id);
        }
        p.submit();
        let generation = p.generation();
        assert!(!p.refresh(&mut ScriptedRandom::new([0.2])));
        assert_eq!(p.generation(), generation);
    }

    #[test]
    fn clear_selection_resets_count() {
        let mut p = puzzle();
        p.toggle(p.items()[1].id);
        p.toggle(p.items()[2].id);
        p.clear_selection();
        assert_eq!(p.selected_count(), 0);
        assert!(p.items().iter().all(|i| !i.selected && !i.flagged));
    }
}
