use serde::Serialize;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean score out of 10, rounded to one decimal place.
    pub average: f64,
    /// The same mean on the five-star scale of the home page.
    pub stars: f64,
    pub count: usize,
}

pub fn is_valid_score(score: u8) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `None` when the film has no ratings yet.
pub fn summarize(scores: &[u8]) -> Option<RatingSummary> {
    if scores.is_empty() {
        return None;
    }
    let total: u32 = scores.iter().map(|&s| u32::from(s)).sum();
    let mean = f64::from(total) / scores.len() as f64;
    Some(RatingSummary {
        average: round_to_tenth(mean),
        stars: round_to_tenth(mean / 2.0),
        count: scores.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_scores_means_no_summary() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        let summary = summarize(&[7, 8, 8]).unwrap();
        assert_eq!(summary.average, 7.7);
        assert_eq!(summary.stars, 3.8);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn score_bounds() {
        assert!(!is_valid_score(0));
        assert!(is_valid_score(1));
        assert!(is_valid_score(10));
        assert!(!is_valid_score(11));
    }
}
