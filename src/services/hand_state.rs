//! Placeholder state extractor producing fixed hand situations.

use crate::dto::{format_epoch_ms, now_epoch_ms, query::HandState};

const DEFAULT_TABLE_ID: &str = "table_001";
const DEFAULT_STREET: &str = "preflop";
const DEFAULT_HERO_POS: &str = "BTN";
const DEFAULT_EFFECTIVE_STACK_BB: f64 = 100.0;
const DEFAULT_POT_BB: f64 = 1.5;
const DEFAULT_ACTION_LINE: &str = "FOLD_FOLD_FOLD_FOLD";

/// Per-field overrides applied on top of the defaults.
#[derive(Debug, Clone, Default)]
pub struct HandStateOverrides {
    /// Replaces `table_001`.
    pub table_id: Option<String>,
    /// Replaces `preflop`.
    pub street: Option<String>,
    /// Replaces `BTN`.
    pub hero_pos: Option<String>,
    /// Replaces 100.
    pub effective_stack_bb: Option<f64>,
    /// Replaces 1.5.
    pub pot_bb: Option<f64>,
    /// Replaces `FOLD_FOLD_FOLD_FOLD`.
    pub action_line: Option<String>,
}

/// Generates hand identifiers and fills in a fixed situation for every frame.
#[derive(Debug, Default)]
pub struct HandStateExtractor {
    hand_counter: u64,
    current_hand_id: Option<String>,
}

impl HandStateExtractor {
    /// Extractor with no hand open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the hand state for the current frame, opening a hand if none is active.
    pub fn extract(&mut self, overrides: &HandStateOverrides) -> HandState {
        let hand_id = match &self.current_hand_id {
            Some(id) => id.clone(),
            None => self.start_new_hand(),
        };

        HandState {
            hand_id,
            table_id: overrides
                .table_id
                .clone()
                .unwrap_or_else(|| DEFAULT_TABLE_ID.into()),
            street: overrides
                .street
                .clone()
                .unwrap_or_else(|| DEFAULT_STREET.into()),
            hero_pos: overrides
                .hero_pos
                .clone()
                .unwrap_or_else(|| DEFAULT_HERO_POS.into()),
            effective_stack_bb: overrides
                .effective_stack_bb
                .unwrap_or(DEFAULT_EFFECTIVE_STACK_BB),
            pot_bb: overrides.pot_bb.unwrap_or(DEFAULT_POT_BB),
            action_line: overrides
                .action_line
                .clone()
                .unwrap_or_else(|| DEFAULT_ACTION_LINE.into()),
            timestamp: format_epoch_ms(now_epoch_ms()),
        }
    }

    /// Open a new hand and return its identifier (`h_<epoch_ms>_<counter>`).
    pub fn start_new_hand(&mut self) -> String {
        self.hand_counter += 1;
        let hand_id = format!("h_{}_{}", now_epoch_ms(), self.hand_counter);
        self.current_hand_id = Some(hand_id.clone());
        hand_id
    }

    /// Identifier of the open hand.
    pub fn current_hand_id(&self) -> Option<&str> {
        self.current_hand_id.as_deref()
    }

    /// Close the open hand and restart the counter.
    pub fn reset(&mut self) {
        self.hand_counter = 0;
        self.current_hand_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{query::Query, validation::missing_required_fields};

    #[test]
    fn extract_fills_defaults_and_satisfies_contract() {
        let mut extractor = HandStateExtractor::new();
        let state = extractor.extract(&HandStateOverrides::default());

        assert!(state.hand_id.starts_with("h_"));
        assert!(state.hand_id.ends_with("_1"));
        assert_eq!(state.hero_pos, "BTN");
        assert_eq!(state.effective_stack_bb, 100.0);
        assert_eq!(state.pot_bb, 1.5);
        assert!(missing_required_fields(&Query::from(state)).is_empty());
    }

    #[test]
    fn hand_id_is_stable_until_new_hand() {
        let mut extractor = HandStateExtractor::new();
        let first = extractor.extract(&HandStateOverrides::default()).hand_id;
        let second = extractor.extract(&HandStateOverrides::default()).hand_id;
        assert_eq!(first, second);

        let next = extractor.start_new_hand();
        assert!(next.ends_with("_2"));
        assert_eq!(extractor.current_hand_id(), Some(next.as_str()));
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut extractor = HandStateExtractor::new();
        let overrides = HandStateOverrides {
            hero_pos: Some("SB".into()),
            effective_stack_bb: Some(30.0),
            action_line: Some("RAISE_CALL".into()),
            ..Default::default()
        };

        let state = extractor.extract(&overrides);
        assert_eq!(state.hero_pos, "SB");
        assert_eq!(state.effective_stack_bb, 30.0);
        assert_eq!(state.action_line, "RAISE_CALL");
        assert_eq!(state.street, "preflop");
    }

    #[test]
    fn reset_restarts_counter() {
        let mut extractor = HandStateExtractor::new();
        extractor.start_new_hand();
        extractor.start_new_hand();
        extractor.reset();

        assert_eq!(extractor.current_hand_id(), None);
        assert!(extractor.start_new_hand().ends_with("_1"));
    }
}
