//! Participant-level session state: the per-round ledger and the
//! once-per-session payment-round decision.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::config::{PayoffMode, TaskConfig};
use crate::currency::Currency;
use crate::grid::BoxCell;
use crate::payoff::{compute_round_result, round_payoff, select_payoff_round};

pub(crate) const LOG_SEED_SET: &str = "log.seed-set";
pub(crate) const LOG_PAYOFF_ROUND_DRAWN: &str = "log.payoff-round-drawn";
pub(crate) const LOG_ROUND_RECORDED: &str = "log.round-recorded";

/// Finalized player input for one round, as posted by the decision form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundInput {
    pub bomb_collected: bool,
    pub boxes_collected: u32,
    pub bomb_cell: BoxCell,
    /// Collected boxes in collection order.
    pub boxes_scheme: Vec<BoxCell>,
}

/// Ledger entry for one completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round number.
    pub round_number: u32,
    pub bomb_collected: bool,
    pub bomb_cell: BoxCell,
    pub boxes_collected: u32,
    pub boxes_scheme: Vec<BoxCell>,
    /// Potential earnings for this round.
    pub round_result: Currency,
    /// Earnings actually credited under the session's payoff mode.
    pub payoff: Currency,
    /// Whether this round was selected by the payoff decision (always true
    /// under sum-all mode).
    pub counted_toward_payoff: bool,
}

/// Mutable per-participant state spanning all rounds of one session.
///
/// The RNG is serialized with its stream position so a session saved
/// between pages resumes where it left off instead of re-dealing boards a
/// participant has already seen. States persisted without an RNG fall back
/// to a fresh stream from the seed via [`SessionState::rehydrate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub seed: u64,
    /// Round drawn for payment; `None` until round 1 settles under
    /// random-round mode, and permanently `None` under sum-all mode.
    #[serde(default)]
    pub round_to_pay: Option<u32>,
    /// Next round to be played, 1-based.
    #[serde(default = "SessionState::first_round")]
    pub current_round: u32,
    #[serde(default)]
    pub records: Vec<RoundRecord>,
    /// Handshake telling the front-end to discard stale round state.
    #[serde(default)]
    pub reset_pending: bool,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub rng: Option<ChaCha20Rng>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            seed: 0,
            round_to_pay: None,
            current_round: Self::first_round(),
            records: Vec::new(),
            reset_pending: false,
            logs: Vec::new(),
            rng: None,
        }
    }
}

impl SessionState {
    const fn first_round() -> u32 {
        1
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = Some(ChaCha20Rng::seed_from_u64(seed));
        self.logs.push(String::from(LOG_SEED_SET));
        self
    }

    /// Restore the RNG for a state persisted without one. A serialized RNG
    /// keeps its stream position and is left untouched.
    #[must_use]
    pub fn rehydrate(mut self) -> Self {
        if self.rng.is_none() {
            self.rng = Some(ChaCha20Rng::seed_from_u64(self.seed));
        }
        self
    }

    /// The payment round, drawing it on first use. Subsequent calls return
    /// the stored decision unchanged.
    pub fn payoff_round(&mut self, num_rounds: u32) -> u32 {
        if let Some(round) = self.round_to_pay {
            return round;
        }
        let seed = self.seed;
        let rng = self
            .rng
            .get_or_insert_with(|| ChaCha20Rng::seed_from_u64(seed));
        let round = select_payoff_round(rng, num_rounds);
        self.round_to_pay = Some(round);
        self.logs.push(String::from(LOG_PAYOFF_ROUND_DRAWN));
        round
    }

    /// Settle the current round: compute its result, credit its payoff
    /// under the session's payoff mode, and append the ledger entry.
    pub fn record_round(&mut self, cfg: &TaskConfig, input: &RoundInput) -> &RoundRecord {
        debug_assert!(
            input.boxes_collected <= cfg.num_boxes(),
            "collected count exceeds grid size"
        );
        let round_number = self.current_round;
        let round_result =
            compute_round_result(input.bomb_collected, input.boxes_collected, cfg.box_value);

        let (payoff, counted) = match cfg.payoff_mode {
            PayoffMode::RandomRound => {
                let round_to_pay = self.payoff_round(cfg.num_rounds);
                let payoff = round_payoff(
                    PayoffMode::RandomRound,
                    round_number,
                    round_to_pay,
                    round_result,
                );
                (payoff, round_number == round_to_pay)
            }
            PayoffMode::SumAllRounds => (round_result, true),
        };

        self.records.push(RoundRecord {
            round_number,
            bomb_collected: input.bomb_collected,
            bomb_cell: input.bomb_cell,
            boxes_collected: input.boxes_collected,
            boxes_scheme: input.boxes_scheme.clone(),
            round_result,
            payoff,
            counted_toward_payoff: counted,
        });
        self.logs.push(String::from(LOG_ROUND_RECORDED));
        self.current_round += 1;
        self.reset_pending = true;
        self.records.last().unwrap_or_else(|| unreachable!())
    }

    /// Final payment across all settled rounds.
    #[must_use]
    pub fn total_payoff(&self) -> Currency {
        self.records.iter().map(|r| r.payoff).sum()
    }

    /// Consume the front-end reset handshake.
    pub fn take_reset_pending(&mut self) -> bool {
        std::mem::take(&mut self.reset_pending)
    }

    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.records.len() as u32
    }
}
