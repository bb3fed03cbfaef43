//! Scripted automated play-through of a full session, with the same
//! assertions a human QA pass would make on round results and final payoff.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ConfigError, PayoffMode, TaskConfig};
use crate::currency::Currency;
use crate::pages::{DecisionVars, PageKind, ResultsVars, is_displayed, page_sequence};
use crate::payoff::compute_round_result;
use crate::session::TaskSession;
use crate::state::RoundInput;

/// Boxes the bot collects every round.
pub const BOT_BOXES_COLLECTED: u32 = 2;

/// Scripted decision profile for a bot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotCase {
    /// The bot reports collecting the bomb every round.
    AlwaysBomb,
    /// The bot never collects the bomb.
    NeverBomb,
}

impl BotCase {
    pub const ALL: [Self; 2] = [Self::AlwaysBomb, Self::NeverBomb];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysBomb => "always_bomb",
            Self::NeverBomb => "never_bomb",
        }
    }

    #[must_use]
    pub const fn bomb_collected(self) -> bool {
        matches!(self, Self::AlwaysBomb)
    }
}

impl fmt::Display for BotCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotCase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always_bomb" => Ok(Self::AlwaysBomb),
            "never_bomb" => Ok(Self::NeverBomb),
            _ => Err(()),
        }
    }
}

/// Assertion failures raised by a bot run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BotError {
    #[error("round {round}: expected result {expected}, got {actual}")]
    RoundResultMismatch {
        round: u32,
        expected: Currency,
        actual: Currency,
    },
    #[error("final payoff: expected {expected}, got {actual}")]
    FinalPayoffMismatch { expected: Currency, actual: Currency },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Per-round trace of a bot run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotRoundOutcome {
    pub round_number: u32,
    pub round_result: Currency,
    pub payoff: Currency,
    pub bomb_cell_row: u32,
    pub bomb_cell_col: u32,
}

/// Summary of one completed bot session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotReport {
    pub case: BotCase,
    pub seed: u64,
    pub rounds: Vec<BotRoundOutcome>,
    pub round_to_pay: Option<u32>,
    pub total_payoff: Currency,
    pub pages_visited: Vec<PageKind>,
}

/// Play a full session as the scripted bot, walking the page sequence and
/// asserting the round result after every decision and the final payoff on
/// the results page.
///
/// # Errors
///
/// Returns `BotError` when the configuration is invalid or an assertion on
/// round results or the final payoff fails.
pub fn run_bot_session(cfg: &TaskConfig, seed: u64, case: BotCase) -> Result<BotReport, BotError> {
    let mut session = TaskSession::new(cfg.clone(), seed)?;
    let sequence = page_sequence(cfg);
    let expected_result = compute_round_result(
        case.bomb_collected(),
        BOT_BOXES_COLLECTED,
        cfg.box_value,
    );

    let mut rounds = Vec::with_capacity(cfg.num_rounds as usize);
    let mut pages_visited = Vec::new();

    for round in 1..=cfg.num_rounds {
        for &page in &sequence {
            if !is_displayed(page, round, cfg) {
                continue;
            }
            pages_visited.push(page);
            match page {
                PageKind::Instructions => {}
                PageKind::Decision => {
                    let vars = DecisionVars::new(cfg, session.state_mut());
                    log::debug!("round {round} decision page, reset={}", vars.reset);

                    let bomb_cell = match session.begin_round() {
                        Some(board) => {
                            board.set_collected_count(BOT_BOXES_COLLECTED);
                            board.bomb()
                        }
                        None => break,
                    };
                    let record = session.submit(&RoundInput {
                        bomb_collected: case.bomb_collected(),
                        boxes_collected: BOT_BOXES_COLLECTED,
                        bomb_cell,
                        boxes_scheme: Vec::new(),
                    });
                    if record.round_result != expected_result {
                        return Err(BotError::RoundResultMismatch {
                            round,
                            expected: expected_result,
                            actual: record.round_result,
                        });
                    }
                    rounds.push(BotRoundOutcome {
                        round_number: record.round_number,
                        round_result: record.round_result,
                        payoff: record.payoff,
                        bomb_cell_row: record.bomb_cell.row,
                        bomb_cell_col: record.bomb_cell.col,
                    });
                }
                PageKind::Results => {
                    let vars = ResultsVars::new(cfg, session.state());
                    let expected_total = match cfg.payoff_mode {
                        // one round is chosen randomly; every round carries
                        // the same result, so the drawn one pays it
                        PayoffMode::RandomRound => expected_result,
                        PayoffMode::SumAllRounds => {
                            expected_result * i64::from(cfg.num_rounds)
                        }
                    };
                    if vars.total_payoff != expected_total {
                        return Err(BotError::FinalPayoffMismatch {
                            expected: expected_total,
                            actual: vars.total_payoff,
                        });
                    }
                }
            }
        }
    }

    Ok(BotReport {
        case,
        seed,
        rounds,
        round_to_pay: session.state().round_to_pay,
        total_payoff: session.total_payoff(),
        pages_visited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_bomb_earns_per_round() {
        let cfg = TaskConfig::default();
        let report = run_bot_session(&cfg, 1337, BotCase::NeverBomb).unwrap();
        assert_eq!(report.rounds.len(), 5);
        assert!(
            report
                .rounds
                .iter()
                .all(|r| r.round_result == Currency::from_units(2))
        );
        assert_eq!(report.total_payoff, Currency::from_units(2));
        assert!(report.round_to_pay.is_some());
    }

    #[test]
    fn always_bomb_earns_nothing() {
        let cfg = TaskConfig::default();
        let report = run_bot_session(&cfg, 1337, BotCase::AlwaysBomb).unwrap();
        assert!(report.rounds.iter().all(|r| r.round_result.is_zero()));
        assert_eq!(report.total_payoff, Currency::ZERO);
    }

    #[test]
    fn sum_all_mode_accumulates() {
        let cfg = TaskConfig {
            payoff_mode: PayoffMode::SumAllRounds,
            ..TaskConfig::default()
        };
        let report = run_bot_session(&cfg, 42, BotCase::NeverBomb).unwrap();
        assert_eq!(report.total_payoff, Currency::from_units(10));
        assert_eq!(report.round_to_pay, None);
    }

    #[test]
    fn page_walk_respects_toggles() {
        let cfg = TaskConfig {
            instructions: false,
            results: false,
            num_rounds: 2,
            ..TaskConfig::default()
        };
        let report = run_bot_session(&cfg, 9, BotCase::NeverBomb).unwrap();
        assert_eq!(
            report.pages_visited,
            vec![PageKind::Decision, PageKind::Decision]
        );

        let cfg = TaskConfig {
            instructions: true,
            results: true,
            ..cfg
        };
        let report = run_bot_session(&cfg, 9, BotCase::NeverBomb).unwrap();
        assert_eq!(report.pages_visited.first(), Some(&PageKind::Instructions));
        assert_eq!(report.pages_visited.last(), Some(&PageKind::Results));
    }

    #[test]
    fn bot_runs_are_deterministic_per_seed() {
        let cfg = TaskConfig::default();
        let a = run_bot_session(&cfg, 555, BotCase::NeverBomb).unwrap();
        let b = run_bot_session(&cfg, 555, BotCase::NeverBomb).unwrap();
        assert_eq!(a, b);
    }
}
