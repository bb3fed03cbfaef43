//! Session configuration: the fixed constants that shape one BRET session.
//!
//! Values are read-only for the duration of a session. Defaults: an 8x8
//! grid, one unit of currency per box, five rounds with one randomly paid
//! round, dynamic timed play with shuffled reveal order.

use num_traits::cast::cast;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::currency::Currency;

/// How the final payment across rounds is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayoffMode {
    /// One round is drawn uniformly at random and only it is paid.
    #[default]
    RandomRound,
    /// Every round is paid; the final payoff is the sum of all rounds.
    SumAllRounds,
}

impl PayoffMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RandomRound => "random_round",
            Self::SumAllRounds => "sum_all_rounds",
        }
    }
}

impl fmt::Display for PayoffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoffMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random_round" => Ok(Self::RandomRound),
            "sum_all_rounds" => Ok(Self::SumAllRounds),
            _ => Err(()),
        }
    }
}

/// Whether boxes accumulate automatically on a timer or under player control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// One box is collected automatically per time interval until stopped.
    #[default]
    Dynamic,
    /// The player collects boxes manually, by clicking or by number entry.
    Static,
}

impl PlayMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dynamic" => Ok(Self::Dynamic),
            "static" => Ok(Self::Static),
            _ => Err(()),
        }
    }
}

/// Order in which boxes are revealed during automatic or counted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevealOrder {
    /// Row-wise one-by-one, starting in the top-left corner.
    Sequential,
    /// Uniformly shuffled reveal order, drawn once per round.
    #[default]
    Shuffled,
}

impl RevealOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Shuffled => "shuffled",
        }
    }
}

impl fmt::Display for RevealOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevealOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Self::Sequential),
            "shuffled" => Ok(Self::Shuffled),
            _ => Err(()),
        }
    }
}

/// How the player expresses a choice in static play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Boxes are toggled individually by clicking, Slovic (1965) style.
    Clicking,
    /// The player enters the number of boxes to collect.
    #[default]
    NumberEntry,
}

impl InputMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clicking => "clicking",
            Self::NumberEntry => "number_entry",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clicking" => Ok(Self::Clicking),
            "number_entry" => Ok(Self::NumberEntry),
            _ => Err(()),
        }
    }
}

/// Validation failures for [`TaskConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

/// Fixed constants for one session of the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Earnings per collected box.
    #[serde(default = "TaskConfig::default_box_value")]
    pub box_value: Currency,
    /// Grid rows; total boxes are `num_rows * num_cols`.
    #[serde(default = "TaskConfig::default_rows")]
    pub num_rows: u32,
    /// Grid columns.
    #[serde(default = "TaskConfig::default_cols")]
    pub num_cols: u32,
    /// CSS box height passed through to the rendering layer.
    #[serde(default = "TaskConfig::default_box_size")]
    pub box_height: String,
    /// CSS box width passed through to the rendering layer.
    #[serde(default = "TaskConfig::default_box_size")]
    pub box_width: String,
    /// Number of rounds played in the session.
    #[serde(default = "TaskConfig::default_num_rounds")]
    pub num_rounds: u32,
    #[serde(default)]
    pub payoff_mode: PayoffMode,
    /// Render a separate instructions page before round 1.
    #[serde(default = "TaskConfig::default_true")]
    pub instructions: bool,
    /// Allow resolving boxes after stopping to reveal the bomb.
    #[serde(default = "TaskConfig::default_true")]
    pub feedback: bool,
    /// Render a results page after the final round.
    #[serde(default = "TaskConfig::default_true")]
    pub results: bool,
    #[serde(default)]
    pub play_mode: PlayMode,
    /// Seconds between automatic collections in dynamic play.
    #[serde(default = "TaskConfig::default_time_interval")]
    pub time_interval_secs: f32,
    #[serde(default)]
    pub reveal_order: RevealOrder,
    /// Only affects static play.
    #[serde(default)]
    pub input_mode: InputMode,
    /// Whether clicked boxes can be de-selected again.
    #[serde(default = "TaskConfig::default_true")]
    pub undoable: bool,
}

impl TaskConfig {
    fn default_box_value() -> Currency {
        Currency::from_units(1)
    }

    const fn default_rows() -> u32 {
        8
    }

    const fn default_cols() -> u32 {
        8
    }

    fn default_box_size() -> String {
        String::from("50px")
    }

    const fn default_num_rounds() -> u32 {
        5
    }

    const fn default_time_interval() -> f32 {
        1.0
    }

    const fn default_true() -> bool {
        true
    }

    /// Parse a configuration from the host platform's JSON settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Total number of boxes on the grid, bomb included.
    #[must_use]
    pub const fn num_boxes(&self) -> u32 {
        self.num_rows * self.num_cols
    }

    /// Whether the front-end shows a number-entry field instead of the grid.
    ///
    /// Dynamic play never takes manual input; static play takes it unless
    /// boxes are selected by clicking.
    #[must_use]
    pub const fn accepts_manual_input(&self) -> bool {
        matches!(self.play_mode, PlayMode::Static)
            && matches!(self.input_mode, InputMode::NumberEntry)
    }

    /// Validate configuration invariants before a session is constructed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_range("num_rows", f64::from(self.num_rows), 1.0, 64.0)?;
        Self::check_range("num_cols", f64::from(self.num_cols), 1.0, 64.0)?;
        Self::check_range("num_rounds", f64::from(self.num_rounds), 1.0, 1_000.0)?;
        Self::check_range(
            "time_interval_secs",
            f64::from(self.time_interval_secs),
            0.01,
            3_600.0,
        )?;
        Self::check_range(
            "box_value",
            cast::<i64, f64>(self.box_value.cents()).unwrap_or(f64::MAX),
            0.0,
            1_000_000.0,
        )?;
        Ok(())
    }

    fn check_range(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), ConfigError> {
        if !(min..=max).contains(&value) {
            return Err(ConfigError::RangeViolation {
                field,
                min,
                max,
                value,
            });
        }
        Ok(())
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            box_value: Self::default_box_value(),
            num_rows: Self::default_rows(),
            num_cols: Self::default_cols(),
            box_height: Self::default_box_size(),
            box_width: Self::default_box_size(),
            num_rounds: Self::default_num_rounds(),
            payoff_mode: PayoffMode::RandomRound,
            instructions: true,
            feedback: true,
            results: true,
            play_mode: PlayMode::Dynamic,
            time_interval_secs: Self::default_time_interval(),
            reveal_order: RevealOrder::Shuffled,
            input_mode: InputMode::NumberEntry,
            undoable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = TaskConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.num_boxes(), 64);
        assert_eq!(cfg.num_rounds, 5);
        assert_eq!(cfg.payoff_mode, PayoffMode::RandomRound);
    }

    #[test]
    fn zero_rows_rejected() {
        let cfg = TaskConfig {
            num_rows: 0,
            ..TaskConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RangeViolation {
                field: "num_rows",
                ..
            }
        ));
    }

    #[test]
    fn manual_input_requires_static_number_entry() {
        let mut cfg = TaskConfig::default();
        assert!(!cfg.accepts_manual_input());

        cfg.play_mode = PlayMode::Static;
        assert!(cfg.accepts_manual_input());

        cfg.input_mode = InputMode::Clicking;
        assert!(!cfg.accepts_manual_input());
    }

    #[test]
    fn enums_round_trip_strings() {
        for mode in [PayoffMode::RandomRound, PayoffMode::SumAllRounds] {
            assert_eq!(mode.as_str().parse::<PayoffMode>().unwrap(), mode);
        }
        assert_eq!("shuffled".parse::<RevealOrder>(), Ok(RevealOrder::Shuffled));
        assert!("diagonal".parse::<RevealOrder>().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: TaskConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, TaskConfig::default());

        let cfg: TaskConfig =
            serde_json::from_str(r#"{"num_rounds": 1, "payoff_mode": "sum_all_rounds"}"#).unwrap();
        assert_eq!(cfg.num_rounds, 1);
        assert_eq!(cfg.payoff_mode, PayoffMode::SumAllRounds);
    }
}
