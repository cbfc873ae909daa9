//! Evidence scoring for ingredient candidates.

use std::cmp::{Ordering, Reverse};

use crate::lexicon::{any_hit, count_hits, count_occurrences, Lexicon};
use crate::normalize::{for_matching, truncate_chars};

use super::harvest::Harvested;

const PRIMARY_STARTER_POINTS: i32 = 50;
const TECHNICAL_POINTS: i32 = 30;
const GENERIC_POINTS: i32 = 10;
const MARKETING_PENALTY: i32 = 25;
const PROMOTIONAL_PENALTY: i32 = 50;

/// `(threshold, bonus)`, checked from the largest threshold down.
const LENGTH_BONUSES: [(usize, i32); 3] = [(500, 30), (300, 20), (100, 10)];
const COMMA_BONUSES: [(usize, i32); 3] = [(20, 30), (10, 20), (5, 10)];

/// Score a candidate, or `None` when it is disqualified outright.
///
/// Disqualified: more than one `ingredients:` label (two products glued
/// together) or any cross-contamination marker.
#[must_use]
pub fn score(text: &str, lexicon: &Lexicon, prefix_window: usize) -> Option<i32> {
    let lower = for_matching(text);

    if count_occurrences(&lower, "ingredients:") > 1 || any_hit(&lower, &lexicon.contamination_markers) {
        return None;
    }

    let prefix = truncate_chars(&lower, prefix_window);
    let mut total = points(count_hits(prefix, &lexicon.primary_starters), PRIMARY_STARTER_POINTS);
    total += points(count_hits(&lower, &lexicon.technical_terms), TECHNICAL_POINTS);
    total += points(count_hits(&lower, &lexicon.generic_ingredients), GENERIC_POINTS);
    total -= points(count_hits(&lower, &lexicon.marketing_terms), MARKETING_PENALTY);
    total -= points(count_hits(&lower, &lexicon.promotional_terms), PROMOTIONAL_PENALTY);

    total += tier_bonus(lower.chars().count(), &LENGTH_BONUSES);
    total += tier_bonus(lower.matches(',').count(), &COMMA_BONUSES);

    Some(total)
}

fn points(hits: usize, each: i32) -> i32 {
    i32::try_from(hits).unwrap_or(i32::MAX / each.max(1)).saturating_mul(each)
}

fn tier_bonus(value: usize, tiers: &[(usize, i32)]) -> i32 {
    tiers
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map_or(0, |(_, bonus)| *bonus)
}

/// A harvested candidate with its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored {
    pub candidate: Harvested,
    pub score: i32,
}

/// Highest score wins. Ties go to the earlier family, then the earlier position.
#[must_use]
pub fn pick_best(scored: Vec<Scored>) -> Option<Scored> {
    scored.into_iter().max_by(compare)
}

fn compare(a: &Scored, b: &Scored) -> Ordering {
    let key = |s: &Scored| (s.score, Reverse(s.candidate.family), Reverse(s.candidate.position));
    key(a).cmp(&key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ingredients::harvest::Family;

    fn lex() -> &'static Lexicon {
        Lexicon::builtin()
    }

    #[test]
    fn evidence_is_monotonic() {
        let weak = score("Chicken, Rice, Barley", lex(), 100);
        let stronger = score("Chicken, Chicken Meal, Rice, Barley, Taurine", lex(), 100);
        assert!(weak.is_some() && stronger.is_some());
        assert!(stronger >= weak);
    }

    #[test]
    fn marketing_is_penalized() {
        let plain = score("Chicken, Rice, Barley", lex(), 100);
        let hyped = score("Chicken, Rice, Barley. Delicious and irresistible!", lex(), 100);
        assert!(hyped < plain);
    }

    #[test]
    fn contamination_disqualifies() {
        assert_eq!(score("Chicken, Rice. You may also like: Salmon Recipe", lex(), 100), None);
        assert_eq!(score("Ingredients: Chicken. Ingredients: Beef", lex(), 100), None);
    }

    #[test]
    fn comma_and_length_tiers() {
        assert_eq!(tier_bonus(4, &COMMA_BONUSES), 0);
        assert_eq!(tier_bonus(6, &COMMA_BONUSES), 10);
        assert_eq!(tier_bonus(21, &COMMA_BONUSES), 30);
        assert_eq!(tier_bonus(301, &LENGTH_BONUSES), 20);
    }

    #[test]
    fn ties_prefer_earlier_family_then_position() {
        let make = |family, position| Scored {
            candidate: Harvested {
                family,
                text: "Chicken, Rice".to_string(),
                position,
            },
            score: 100,
        };
        let best = pick_best(vec![
            make(Family::Sentence, 0),
            make(Family::LabeledBlock, 50),
            make(Family::LabeledBlock, 10),
        ]);
        assert_eq!(best.map(|b| (b.candidate.family, b.candidate.position)), Some((Family::LabeledBlock, 10)));
    }
}
