//! Usage cost estimate
//!
//! Rough USD estimate for running a question count through the primary provider

use serde::{Deserialize, Serialize};

/// USD per 1K input tokens
pub const INPUT_COST_PER_1K: f64 = 0.0005;
/// USD per 1K output tokens
pub const OUTPUT_COST_PER_1K: f64 = 0.0015;

/// Tokens per response assumed before answers exist
pub const DEFAULT_TOKENS_PER_RESPONSE: u32 = 500;
/// Tokens per response assumed once answers have been generated
pub const ANSWER_TOKENS_PER_RESPONSE: u32 = 700;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub num_questions: u32,
    pub tokens_per_response: u32,
    pub estimated_usd: f64,
}

/// Estimated cost in USD, rounded to four decimals
pub fn estimate_cost(num_questions: u32, tokens_per_response: u32) -> CostEstimate {
    let total_tokens = f64::from(num_questions) * f64::from(tokens_per_response);
    let raw = total_tokens / 1000.0 * (INPUT_COST_PER_1K + OUTPUT_COST_PER_1K);

    CostEstimate {
        num_questions,
        tokens_per_response,
        estimated_usd: (raw * 10_000.0).round() / 10_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_estimate() {
        // 30 * 500 = 15K tokens at 0.002 per 1K
        assert_eq!(estimate_cost(30, DEFAULT_TOKENS_PER_RESPONSE).estimated_usd, 0.03);
    }

    #[test]
    fn test_rounding_to_four_decimals() {
        // 1 * 700 tokens = 0.0014
        assert_eq!(estimate_cost(1, ANSWER_TOKENS_PER_RESPONSE).estimated_usd, 0.0014);
        assert_eq!(estimate_cost(7, 333).estimated_usd, 0.0047);
    }

    #[test]
    fn test_zero_questions() {
        assert_eq!(estimate_cost(0, 500).estimated_usd, 0.0);
    }
}
