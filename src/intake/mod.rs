//! Problem and context intake: uploads, quality meter and prefills.

mod quality;
mod upload;

pub use quality::*;
pub use upload::*;

use std::time::Duration;

/// Problem of the "Try an example" prefill.
pub const EXAMPLE_PROBLEM: &str = "Customers are leaving our service after the first month";

/// Context of the "Try an example" prefill.
pub const EXAMPLE_CONTEXT: &str = "SaaS startup, B2C, 10,000 active users, team of 5";

/// How long each problem placeholder stays before rotating.
pub const PLACEHOLDER_INTERVAL: Duration = Duration::from_secs(3);

/// Sample problems cycled through while the problem field is empty.
pub const PROBLEM_PLACEHOLDERS: [&str; 5] = [
    "e.g., Our B2B SaaS startup is struggling with a high customer churn rate, especially within the first 3 months...",
    "e.g., We need to develop a go-to-market strategy for a new sustainable fashion brand targeting millennials...",
    "e.g., How can our non-profit organization increase volunteer engagement and attract more donations online?",
    "e.g., Our e-commerce site has high traffic but a low conversion rate. We need to optimize the user journey...",
    "e.g., As a traditional retail business, we need a digital transformation roadmap to stay competitive...",
];

/// Placeholder shown after `elapsed` time on an empty problem field.
pub fn placeholder_at(elapsed: Duration) -> &'static str {
    let tick = elapsed.as_millis() / PLACEHOLDER_INTERVAL.as_millis();
    PROBLEM_PLACEHOLDERS[(tick % PROBLEM_PLACEHOLDERS.len() as u128) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_rotation() {
        assert_eq!(placeholder_at(Duration::ZERO), PROBLEM_PLACEHOLDERS[0]);
        assert_eq!(placeholder_at(Duration::from_millis(2999)), PROBLEM_PLACEHOLDERS[0]);
        assert_eq!(placeholder_at(Duration::from_secs(3)), PROBLEM_PLACEHOLDERS[1]);
        assert_eq!(placeholder_at(Duration::from_secs(15)), PROBLEM_PLACEHOLDERS[0]);
    }
}
