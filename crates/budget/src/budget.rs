use crate::error::Error;
use crate::limits::{DEFAULT_SAFETY_MARGIN, MIN_FLOOR};

/// The token accounting for one request: how much context the model has,
/// how much is already spoken for, and what's left for the message list.
#[derive(Debug, Clone, Copy)]
pub struct TokenBudget {
    pub context_length: u32,
    pub tools_tokens: u32,
    pub max_completion_tokens: Option<u32>,
    pub fixed_overhead: u32,
    pub response_reserve: u32,
    pub available_for_messages: u32,
}

impl TokenBudget {
    /// `response_reserve` is the caller's `max_tokens` if given, else
    /// `(1 - safety_margin) * context_length`.
    pub fn build(context_length: u32, tools_tokens: u32, max_completion_tokens: Option<u32>, fixed_overhead: u32, safety_margin: Option<f32>) -> Result<Self, Error> {
        let safety_margin = safety_margin.unwrap_or(DEFAULT_SAFETY_MARGIN);

        let response_reserve = max_completion_tokens.unwrap_or_else(|| ((1.0 - safety_margin) * context_length as f32).round() as u32);

        let available = context_length as i64 - tools_tokens as i64 - response_reserve as i64 - fixed_overhead as i64;

        if available < MIN_FLOOR as i64 {
            return Err(Error::BudgetExceeded {
                context_length,
                tools_tokens,
                response_reserve,
                fixed_overhead,
                available,
                floor: MIN_FLOOR,
            });
        }

        Ok(Self {
            context_length,
            tools_tokens,
            max_completion_tokens,
            fixed_overhead,
            response_reserve,
            available_for_messages: available as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_max_tokens_is_used_as_the_reserve() {
        let budget = TokenBudget::build(128_000, 500, Some(4_096), 100, None).unwrap();
        assert_eq!(budget.response_reserve, 4_096);
    }

    #[test]
    fn missing_max_tokens_falls_back_to_safety_margin() {
        let budget = TokenBudget::build(100_000, 0, None, 0, Some(0.75)).unwrap();
        assert_eq!(budget.response_reserve, 25_000);
        assert_eq!(budget.available_for_messages, 75_000);
    }

    #[test]
    fn below_floor_is_rejected() {
        let err = TokenBudget::build(2_000, 0, Some(1_500), 0, None).unwrap_err();
        assert!(matches!(err, Error::BudgetExceeded { .. }));
    }
}
