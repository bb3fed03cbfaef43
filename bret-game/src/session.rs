//! High-level session wrapper binding a task configuration to mutable
//! participant state.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, TaskConfig};
use crate::currency::Currency;
use crate::grid::RoundBoard;
use crate::state::{RoundInput, RoundRecord, SessionState};

/// One participant's run through the task: configuration, per-round board,
/// and the cross-round ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSession {
    cfg: TaskConfig,
    state: SessionState,
    /// Board for the round in progress, if one has been dealt.
    board: Option<RoundBoard>,
}

impl TaskSession {
    /// Construct a fresh session from a validated configuration and seed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates its bounds.
    pub fn new(cfg: TaskConfig, seed: u64) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            state: SessionState::default().with_seed(seed),
            board: None,
        })
    }

    /// Rebuild a session from persisted participant state.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates its bounds.
    pub fn from_state(cfg: TaskConfig, state: SessionState) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            state: state.rehydrate(),
            board: None,
        })
    }

    /// Deal the board for the current round, drawing the bomb cell and the
    /// reveal order from the session RNG. Returns `None` once all rounds
    /// have been played.
    pub fn begin_round(&mut self) -> Option<&mut RoundBoard> {
        if self.is_finished() {
            return None;
        }
        let seed = self.state.seed;
        let rng = self
            .state
            .rng
            .get_or_insert_with(|| ChaCha20Rng::seed_from_u64(seed));
        let mut board = RoundBoard::new(&self.cfg, rng);
        board.start();
        self.board = Some(board);
        self.board.as_mut()
    }

    /// Board for the round in progress, if any.
    pub fn board_mut(&mut self) -> Option<&mut RoundBoard> {
        self.board.as_mut()
    }

    /// Settle the round in progress from its board state. The bomb is
    /// collected exactly when the board's bomb cell is among the collected
    /// boxes.
    pub fn finish_round(&mut self) -> Option<&RoundRecord> {
        let mut board = self.board.take()?;
        board.stop();
        let input = RoundInput {
            bomb_collected: board.has_bomb(),
            boxes_collected: board.collected_count(),
            bomb_cell: board.bomb(),
            boxes_scheme: board.scheme().to_vec(),
        };
        Some(self.state.record_round(&self.cfg, &input))
    }

    /// Settle the current round from pre-validated form input, discarding
    /// any board in progress. This is the path the host's form layer takes.
    pub fn submit(&mut self, input: &RoundInput) -> &RoundRecord {
        self.board = None;
        self.state.record_round(&self.cfg, input)
    }

    /// Whether every configured round has been settled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.rounds_played() >= self.cfg.num_rounds
    }

    #[must_use]
    pub fn total_payoff(&self) -> Currency {
        self.state.total_payoff()
    }

    #[must_use]
    pub const fn config(&self) -> &TaskConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Apply a closure to the mutable session state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.state)
    }

    /// Consume the session, returning the participant state for storage.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }
}
