//! Steers a drawn selection toward a requested combined rating.
//!
//! Service-connected picks are rebuilt greedily: each round adds the template/rating pair
//! that moves the combined rating closest to the target, preferring templates already drawn
//! for this profile, then the rest of the eligible list. It stops when no addition helps,
//! so the result is the nearest rating this search reaches rather than a forced exact hit.

use super::{conditions_of, picked, Pick};
use crate::disability::catalog::ConditionTemplate;
use crate::disability::combiner::{RatingCombiner, RatingError};

pub(super) fn steer(
    eligible: &[&'static ConditionTemplate],
    drawn: Vec<Pick>,
    hint: u8,
) -> Result<Vec<Pick>, RatingError> {
    let target = round_hint(hint);
    let (connected, unconnected): (Vec<Pick>, Vec<Pick>) =
        drawn.into_iter().partition(|pick| pick.service_connected);

    let mut pool: Vec<&'static ConditionTemplate> =
        connected.iter().map(|pick| pick.template).collect();
    for template in eligible.iter().copied() {
        if !pool
            .iter()
            .any(|known| known.diagnostic_code == template.diagnostic_code)
            && !picked(&unconnected, template)
        {
            pool.push(template);
        }
    }

    let mut chosen: Vec<Pick> = Vec::new();
    let mut distance = target;

    while distance > 0 {
        let mut best: Option<(u8, Pick)> = None;
        for template in pool.iter().copied() {
            if picked(&chosen, template) || !primary_present(&chosen, template) {
                continue;
            }
            for rating in template.compensable_ratings() {
                let candidate = Pick::new(template, rating, true);
                let mut trial = chosen.clone();
                trial.push(candidate);
                let trial_distance = distance_to(&trial, target)?;
                if trial_distance < best.map_or(distance, |(current, _)| current) {
                    best = Some((trial_distance, candidate));
                }
            }
        }

        match best {
            Some((next_distance, pick)) => {
                chosen.push(pick);
                distance = next_distance;
            }
            None => break,
        }
    }

    if chosen.is_empty() {
        chosen = connected;
    }
    chosen.extend(unconnected);
    Ok(chosen)
}

/// Hints snap to the rating schedule's 10% steps.
fn round_hint(hint: u8) -> u8 {
    let clamped = u16::from(hint.min(100));
    (((clamped + 5) / 10) * 10) as u8
}

fn primary_present(chosen: &[Pick], template: &ConditionTemplate) -> bool {
    match template.secondary_to {
        Some(code) => chosen
            .iter()
            .any(|pick| pick.template.diagnostic_code == code),
        None => true,
    }
}

fn distance_to(picks: &[Pick], target: u8) -> Result<u8, RatingError> {
    let combined = RatingCombiner::combine(&conditions_of(picks))?;
    Ok(combined.abs_diff(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disability::catalog::ConditionCatalog;
    use crate::disability::domain::Branch;

    #[test]
    fn hints_round_half_up_to_ten() {
        assert_eq!(round_hint(5), 10);
        assert_eq!(round_hint(44), 40);
        assert_eq!(round_hint(45), 50);
        assert_eq!(round_hint(250), 100);
    }

    #[test]
    fn steering_hits_reachable_targets_exactly() {
        let catalog = ConditionCatalog::standard();
        let eligible = catalog.list_by_eligibility(Branch::Army, true);
        for target in [10, 20, 30, 40, 50, 60, 70, 100] {
            let picks = steer(&eligible, Vec::new(), target).expect("valid ratings");
            let combined =
                RatingCombiner::combine(&conditions_of(&picks)).expect("valid ratings");
            assert_eq!(combined, target);
        }
    }

    #[test]
    fn unconnected_picks_are_kept() {
        let catalog = ConditionCatalog::standard();
        let eligible = catalog.list_by_eligibility(Branch::Navy, false);
        let gerd = catalog.lookup("K21.9").expect("gerd");
        let picks = steer(&eligible, vec![Pick::new(gerd, 0, false)], 40).expect("valid");
        assert!(picks
            .iter()
            .any(|pick| pick.template.diagnostic_code == "K21.9" && !pick.service_connected));
        assert!(picks.iter().filter(|pick| pick.service_connected).count() >= 1);
    }

    #[test]
    fn secondary_needs_its_primary() {
        let catalog = ConditionCatalog::standard();
        let apnea = catalog.lookup("G47.33").expect("sleep apnea");
        assert!(!primary_present(&[], apnea));
        let ptsd = catalog.lookup("F43.10").expect("ptsd");
        assert!(primary_present(&[Pick::new(ptsd, 50, true)], apnea));
    }
}
