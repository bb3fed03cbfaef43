//! Round outcome and payment-round selection.
//!
//! Both functions are pure given the RNG; inputs are validated by the page
//! layer before they reach here, so violations are programming errors.

use rand::Rng;

use crate::config::PayoffMode;
use crate::currency::Currency;

/// Result of a single round: zero if the bomb was collected, otherwise the
/// number of collected boxes times the per-box value.
#[must_use]
pub fn compute_round_result(
    bomb_collected: bool,
    boxes_collected: u32,
    box_value: Currency,
) -> Currency {
    if bomb_collected {
        return Currency::ZERO;
    }
    box_value * i64::from(boxes_collected)
}

/// Draw the round that counts toward payment, uniform in `[1, num_rounds]`.
///
/// Called exactly once per session, at round 1; the caller persists the
/// result for the remainder of the session.
#[must_use]
pub fn select_payoff_round(rng: &mut impl Rng, num_rounds: u32) -> u32 {
    debug_assert!(num_rounds >= 1, "session must have at least one round");
    rng.gen_range(1..=num_rounds)
}

/// Payment credited for one round under the session's payoff mode.
///
/// Under [`PayoffMode::RandomRound`] only the drawn round pays out; under
/// [`PayoffMode::SumAllRounds`] every round pays its own result.
#[must_use]
pub fn round_payoff(
    mode: PayoffMode,
    round_number: u32,
    round_to_pay: u32,
    round_result: Currency,
) -> Currency {
    debug_assert!(round_number >= 1, "round numbers are 1-based");
    match mode {
        PayoffMode::RandomRound => {
            if round_number == round_to_pay {
                round_result
            } else {
                Currency::ZERO
            }
        }
        PayoffMode::SumAllRounds => round_result,
    }
}
