//! BRET Task Engine
//!
//! Platform-agnostic core logic for the Bomb Risk Elicitation Task
//! (Crosetto/Filippin 2013). This crate provides round outcomes, payment
//! selection, grid mechanics, and page sequencing without any HTTP, form,
//! or template dependencies; the hosting experiment framework supplies
//! those and calls into the seams defined here.

pub mod bot;
pub mod config;
pub mod currency;
pub mod grid;
pub mod pages;
pub mod payoff;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use bot::{BOT_BOXES_COLLECTED, BotCase, BotError, BotReport, run_bot_session};
pub use config::{ConfigError, InputMode, PayoffMode, PlayMode, RevealOrder, TaskConfig};
pub use currency::Currency;
pub use grid::{BoxCell, RoundBoard, row_major_cells};
pub use pages::{
    DecisionVars, InstructionsVars, PageKind, ResultsVars, is_displayed, page_sequence,
};
pub use payoff::{compute_round_result, round_payoff, select_payoff_round};
pub use session::TaskSession;
pub use state::{RoundInput, RoundRecord, SessionState};

/// Trait for loading session configuration from the platform's settings
/// source. Platform-specific implementations should provide this.
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the task configuration for the running session.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_task_config(&self) -> Result<TaskConfig, Self::Error>;
}

/// Trait for abstracting participant-level persistence.
/// Platform-specific implementations should provide this.
pub trait ParticipantStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a participant's session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    fn save_session(&self, participant: &str, state: &SessionState) -> Result<(), Self::Error>;

    /// Load a participant's session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be loaded.
    fn load_session(&self, participant: &str) -> Result<Option<SessionState>, Self::Error>;

    /// Delete a participant's session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be deleted.
    fn delete_session(&self, participant: &str) -> Result<(), Self::Error>;
}

/// Main engine binding configuration loading and participant storage.
pub struct TaskEngine<L, S>
where
    L: ConfigLoader,
    S: ParticipantStore,
{
    config_loader: L,
    store: S,
}

/// Failure modes surfaced by [`TaskEngine`] operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError<L, S>
where
    L: std::error::Error + Send + Sync + 'static,
    S: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("config source: {0}")]
    Loader(L),
    #[error("participant store: {0}")]
    Store(S),
}

impl<L, S> TaskEngine<L, S>
where
    L: ConfigLoader,
    S: ParticipantStore,
{
    /// Create a new engine with the provided config loader and store.
    pub const fn new(config_loader: L, store: S) -> Self {
        Self {
            config_loader,
            store,
        }
    }

    /// Start a fresh session for the given seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn create_session(&self, seed: u64) -> Result<TaskSession, EngineError<L::Error, S::Error>> {
        let cfg = self
            .config_loader
            .load_task_config()
            .map_err(EngineError::Loader)?;
        Ok(TaskSession::new(cfg, seed)?)
    }

    /// Persist a session's participant state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn save_session(
        &self,
        participant: &str,
        state: &SessionState,
    ) -> Result<(), EngineError<L::Error, S::Error>> {
        self.store
            .save_session(participant, state)
            .map_err(EngineError::Store)
    }

    /// Load and rehydrate a participant's session.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or state cannot be loaded.
    pub fn load_session(
        &self,
        participant: &str,
    ) -> Result<Option<TaskSession>, EngineError<L::Error, S::Error>> {
        let Some(state) = self
            .store
            .load_session(participant)
            .map_err(EngineError::Store)?
        else {
            return Ok(None);
        };
        let cfg = self
            .config_loader
            .load_task_config()
            .map_err(EngineError::Loader)?;
        Ok(Some(TaskSession::from_state(cfg, state)?))
    }
}
