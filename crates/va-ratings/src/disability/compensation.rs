use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Dollar amount held as whole cents; serialized as a decimal dollar figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Usd(pub u64);

impl Usd {
    pub const ZERO: Usd = Usd(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Usd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.dollars())
    }
}

impl<'de> Deserialize<'de> for Usd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dollars = f64::deserialize(deserializer)?;
        if !dollars.is_finite() || dollars < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "invalid dollar amount {dollars}"
            )));
        }
        Ok(Usd((dollars * 100.0).round() as u64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompensationError {
    #[error("combined rating {0}% is not a multiple of 10 between 0 and 100")]
    InvalidRating(u8),
    #[error("no compensation brackets published for {0}%")]
    UnpublishedRating(u8),
}

/// Monthly amount returned by the lookup. `approximated` is set when the exact dependent
/// count has no published bracket and the nearest lower bracket was used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationAmount {
    pub monthly: Usd,
    pub approximated: bool,
    pub bracket_dependents: u8,
}

/// Sparse rate table keyed by (combined rating, dependent count).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationLookup {
    brackets: BTreeMap<(u8, u8), Usd>,
}

/// 2024 monthly rates in cents for 0..=3 dependents: veteran alone, with spouse,
/// with spouse and one child, with spouse and two children.
const SCHEDULE_2024: &[(u8, [u64; 4])] = &[
    (0, [0, 0, 0, 0]),
    (10, [17_123, 17_123, 17_123, 17_123]),
    (20, [33_849, 33_849, 33_849, 33_849]),
    (30, [52_431, 58_631, 63_231, 66_331]),
    (40, [75_528, 83_828, 89_928, 94_028]),
    (50, [107_516, 117_916, 125_516, 130_616]),
    (60, [136_188, 148_688, 157_788, 163_988]),
    (70, [171_628, 186_128, 196_728, 203_928]),
    (80, [199_501, 216_101, 228_301, 236_501]),
    (90, [224_191, 242_891, 256_591, 265_891]),
    (100, [373_785, 394_625, 409_887, 420_161]),
];

impl CompensationLookup {
    pub fn schedule_2024() -> Self {
        Self::from_brackets(SCHEDULE_2024.iter().flat_map(|(rating, amounts)| {
            amounts
                .iter()
                .enumerate()
                .map(move |(dependents, cents)| (*rating, dependents as u8, Usd(*cents)))
        }))
    }

    pub fn from_brackets(brackets: impl IntoIterator<Item = (u8, u8, Usd)>) -> Self {
        Self {
            brackets: brackets
                .into_iter()
                .map(|(rating, dependents, amount)| ((rating, dependents), amount))
                .collect(),
        }
    }

    pub fn amount(
        &self,
        combined_rating: u8,
        dependents: u8,
    ) -> Result<CompensationAmount, CompensationError> {
        if combined_rating % 10 != 0 || combined_rating > 100 {
            return Err(CompensationError::InvalidRating(combined_rating));
        }

        let ((_, bracket_dependents), monthly) = self
            .brackets
            .range((combined_rating, 0)..=(combined_rating, dependents))
            .next_back()
            .ok_or(CompensationError::UnpublishedRating(combined_rating))?;

        Ok(CompensationAmount {
            monthly: *monthly,
            approximated: *bracket_dependents != dependents,
            bracket_dependents: *bracket_dependents,
        })
    }
}

impl Default for CompensationLookup {
    fn default() -> Self {
        Self::schedule_2024()
    }
}
