//! Combined disability rating under the VA "efficiency remaining" rule.
//!
//! Ratings are not added. Each disability is applied to whatever capacity the previous
//! ones left, largest first, and the result is rounded to the nearest 10%. Paired-limb
//! conditions are first merged into one entry carrying the bilateral factor.

use serde::{Deserialize, Serialize};

use super::domain::Condition;

/// Percentage added to the bilateral group's sum.
pub const BILATERAL_FACTOR_PERCENT: u32 = 10;

/// Minimum number of paired-limb entries before the bilateral factor applies.
pub const BILATERAL_MINIMUM_ENTRIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("condition '{condition}' is rated {rating}%, ratings must be a multiple of 10 between 0 and 100")]
    InvalidRatingValue { condition: String, rating: u8 },
}

/// Merged entry standing in for two or more paired-limb conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BilateralAdjustment {
    pub entries: Vec<u8>,
    pub raw_sum: u32,
    pub factor: u32,
    pub adjusted: u8,
}

impl BilateralAdjustment {
    fn from_ratings(entries: Vec<u8>) -> Self {
        // Saturating: request lists are unbounded.
        let raw_sum = entries
            .iter()
            .fold(0u32, |sum, rating| sum.saturating_add(u32::from(*rating)));
        let factor = raw_sum.saturating_mul(BILATERAL_FACTOR_PERCENT) / 100;
        let adjusted = raw_sum.saturating_add(factor).min(100) as u8;

        Self {
            entries,
            raw_sum,
            factor,
            adjusted,
        }
    }
}

/// One step of the descending fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldStep {
    pub rating: u8,
    pub combined: u8,
}

/// Full trail of a combination, for audits and operator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bilateral: Option<BilateralAdjustment>,
    pub steps: Vec<FoldStep>,
    /// Whole-number result of the fold before rounding to the nearest 10.
    pub exact: u8,
    pub combined: u8,
}

/// Stateless combined-rating calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingCombiner;

impl RatingCombiner {
    pub fn combine(conditions: &[Condition]) -> Result<u8, RatingError> {
        Self::breakdown(conditions).map(|breakdown| breakdown.combined)
    }

    pub fn breakdown(conditions: &[Condition]) -> Result<CombinationBreakdown, RatingError> {
        for condition in conditions {
            validate_rating(condition)?;
        }

        let (bilateral, ordinary): (Vec<&Condition>, Vec<&Condition>) =
            conditions.iter().partition(|condition| condition.bilateral);

        let mut ratings: Vec<u8> = ordinary
            .iter()
            .map(|condition| condition.rating_percent)
            .collect();

        let bilateral = if bilateral.len() >= BILATERAL_MINIMUM_ENTRIES {
            let adjustment = BilateralAdjustment::from_ratings(
                bilateral
                    .iter()
                    .map(|condition| condition.rating_percent)
                    .collect(),
            );
            ratings.push(adjustment.adjusted);
            Some(adjustment)
        } else {
            ratings.extend(bilateral.iter().map(|condition| condition.rating_percent));
            None
        };

        ratings.sort_unstable_by(|left, right| right.cmp(left));

        let mut combined: u16 = 0;
        let steps = ratings
            .iter()
            .map(|rating| {
                combined = apply_remaining(combined, *rating);
                FoldStep {
                    rating: *rating,
                    combined: combined as u8,
                }
            })
            .collect();

        Ok(CombinationBreakdown {
            bilateral,
            steps,
            exact: combined as u8,
            combined: round_to_nearest_ten(combined),
        })
    }
}

fn validate_rating(condition: &Condition) -> Result<(), RatingError> {
    let rating = condition.rating_percent;
    if rating % 10 != 0 || rating > 100 {
        return Err(RatingError::InvalidRatingValue {
            condition: condition.name.clone(),
            rating,
        });
    }
    Ok(())
}

/// `combined + (100 - combined) * rating / 100`, rounded half-up to a whole percent.
fn apply_remaining(combined: u16, rating: u8) -> u16 {
    let remaining = 100 - combined;
    combined + (remaining * u16::from(rating) + 50) / 100
}

fn round_to_nearest_ten(value: u16) -> u8 {
    (((value + 5) / 10) * 10).min(100) as u8
}
