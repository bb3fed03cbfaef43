//! Page sequencing and template variables consumed by the hosting
//! framework's rendering layer.
//!
//! The host owns HTTP, forms, and templates; this module only decides which
//! pages appear, when each is displayed, and what serialized variables each
//! template receives.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TaskConfig;
use crate::currency::Currency;
use crate::state::{RoundRecord, SessionState};

/// The pages a participant can be routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Instructions,
    Decision,
    Results,
}

impl PageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instructions => "instructions",
            Self::Decision => "decision",
            Self::Results => "results",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page order for one round, honoring the instructions/results toggles.
#[must_use]
pub fn page_sequence(cfg: &TaskConfig) -> Vec<PageKind> {
    let mut sequence = vec![PageKind::Decision];
    if cfg.instructions {
        sequence.insert(0, PageKind::Instructions);
    }
    if cfg.results {
        sequence.push(PageKind::Results);
    }
    sequence
}

/// Whether a page is shown in the given round. Instructions appear only
/// before round 1; results only after the final round.
#[must_use]
pub fn is_displayed(page: PageKind, round_number: u32, cfg: &TaskConfig) -> bool {
    match page {
        PageKind::Instructions => round_number == 1,
        PageKind::Decision => true,
        PageKind::Results => round_number == cfg.num_rounds,
    }
}

/// Variables for the instructions template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionsVars {
    pub num_rows: u32,
    pub num_cols: u32,
    pub num_boxes: u32,
    /// Boxes that are safe to collect.
    pub num_nobomb: u32,
    pub box_value: Currency,
    pub time_interval_secs: f32,
}

impl InstructionsVars {
    #[must_use]
    pub fn new(cfg: &TaskConfig) -> Self {
        Self {
            num_rows: cfg.num_rows,
            num_cols: cfg.num_cols,
            num_boxes: cfg.num_boxes(),
            num_nobomb: cfg.num_boxes() - 1,
            box_value: cfg.box_value,
            time_interval_secs: cfg.time_interval_secs,
        }
    }
}

/// Settings block handed to the front-end grid application on the decision
/// page. Serialized to JSON by the host template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionVars {
    /// Discard stale front-end round state from the previous round.
    pub reset: bool,
    /// Show a number-entry field instead of clickable boxes.
    pub input: bool,
    /// Shuffled reveal order.
    pub random: bool,
    /// Timed automatic collection.
    pub dynamic: bool,
    pub num_rows: u32,
    pub num_cols: u32,
    pub feedback: bool,
    pub undoable: bool,
    pub box_width: String,
    pub box_height: String,
    pub time_interval_secs: f32,
}

impl DecisionVars {
    /// Build the decision-page settings, consuming the reset handshake left
    /// by the previous round.
    #[must_use]
    pub fn new(cfg: &TaskConfig, state: &mut SessionState) -> Self {
        Self {
            reset: state.take_reset_pending(),
            input: cfg.accepts_manual_input(),
            random: matches!(cfg.reveal_order, crate::config::RevealOrder::Shuffled),
            dynamic: matches!(cfg.play_mode, crate::config::PlayMode::Dynamic),
            num_rows: cfg.num_rows,
            num_cols: cfg.num_cols,
            feedback: cfg.feedback,
            undoable: cfg.undoable,
            box_width: cfg.box_width.clone(),
            box_height: cfg.box_height.clone(),
            time_interval_secs: cfg.time_interval_secs,
        }
    }
}

/// Variables for the results template shown after the final round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsVars {
    /// Ledger of all settled rounds, in order.
    pub rounds: Vec<RoundRecord>,
    pub box_value: Currency,
    pub boxes_total: u32,
    /// `None` under sum-all mode.
    pub round_to_pay: Option<u32>,
    pub total_payoff: Currency,
}

impl ResultsVars {
    #[must_use]
    pub fn new(cfg: &TaskConfig, state: &SessionState) -> Self {
        Self {
            rounds: state.records.clone(),
            box_value: cfg.box_value,
            boxes_total: cfg.num_boxes(),
            round_to_pay: state.round_to_pay,
            total_payoff: state.total_payoff(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BoxCell;
    use crate::state::RoundInput;

    #[test]
    fn sequence_honors_toggles() {
        let cfg = TaskConfig::default();
        assert_eq!(
            page_sequence(&cfg),
            vec![PageKind::Instructions, PageKind::Decision, PageKind::Results]
        );

        let cfg = TaskConfig {
            instructions: false,
            results: false,
            ..TaskConfig::default()
        };
        assert_eq!(page_sequence(&cfg), vec![PageKind::Decision]);
    }

    #[test]
    fn display_rules_follow_round_number() {
        let cfg = TaskConfig::default();
        assert!(is_displayed(PageKind::Instructions, 1, &cfg));
        assert!(!is_displayed(PageKind::Instructions, 2, &cfg));
        assert!(is_displayed(PageKind::Decision, 3, &cfg));
        assert!(!is_displayed(PageKind::Results, 4, &cfg));
        assert!(is_displayed(PageKind::Results, 5, &cfg));
    }

    #[test]
    fn instructions_vars_count_safe_boxes() {
        let vars = InstructionsVars::new(&TaskConfig::default());
        assert_eq!(vars.num_boxes, 64);
        assert_eq!(vars.num_nobomb, 63);
    }

    #[test]
    fn decision_vars_consume_reset_handshake() {
        let cfg = TaskConfig::default();
        let mut state = SessionState::default().with_seed(8);
        state.record_round(
            &cfg,
            &RoundInput {
                bomb_collected: false,
                boxes_collected: 1,
                bomb_cell: BoxCell::new(1, 1),
                boxes_scheme: Vec::new(),
            },
        );

        let vars = DecisionVars::new(&cfg, &mut state);
        assert!(vars.reset);
        let vars = DecisionVars::new(&cfg, &mut state);
        assert!(!vars.reset);
        assert!(vars.dynamic);
        assert!(!vars.input);
    }

    #[test]
    fn results_vars_summarize_session() {
        let cfg = TaskConfig {
            num_rounds: 2,
            ..TaskConfig::default()
        };
        let mut state = SessionState::default().with_seed(12);
        for _ in 0..2 {
            state.record_round(
                &cfg,
                &RoundInput {
                    bomb_collected: false,
                    boxes_collected: 3,
                    bomb_cell: BoxCell::new(2, 2),
                    boxes_scheme: Vec::new(),
                },
            );
        }

        let vars = ResultsVars::new(&cfg, &state);
        assert_eq!(vars.rounds.len(), 2);
        assert_eq!(vars.boxes_total, 64);
        assert_eq!(vars.round_to_pay, state.round_to_pay);
        assert_eq!(vars.total_payoff, state.total_payoff());

        // host templates consume these via JSON
        let json = serde_json::to_value(&vars).unwrap();
        assert!(json.get("rounds").is_some());
    }
}
