//! Guaranteed analysis and caloric content.
//!
//! Both are read from the flattened page text, preferring the section
//! after a "Guaranteed Analysis" / "Calorie Content" heading when one is
//! present. When the static page has nothing, the rendered document (if
//! any) is tried with the same patterns.

use std::ops::RangeInclusive;

use regex::Regex;

use crate::chain::ExtractionContext;
use crate::result::{CaloricInfo, NONE_SUCCESSFUL};
use crate::patterns::{GA_FAT, GA_FIBER, GA_MOISTURE, GA_PROTEIN, KCAL_PER_KG, KCAL_PER_UNIT};

/// How far after a kcal/kg figure a per-unit figure may appear.
const PER_UNIT_WINDOW: usize = 80;

/// Parsed guaranteed-analysis components, as percentages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuaranteedAnalysis {
    pub protein: Option<String>,
    pub fat: Option<String>,
    pub fiber: Option<String>,
    pub moisture: Option<String>,
}

impl GuaranteedAnalysis {
    /// Protein plus fat or moisture is the minimum worth reporting.
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        self.protein.is_some() && (self.fat.is_some() || self.moisture.is_some())
    }

    /// `"Crude Protein (min) 26%, Crude Fat (min) 15%, ..."`, found parts only.
    #[must_use]
    pub fn canonical(&self) -> String {
        [
            ("Crude Protein (min)", &self.protein),
            ("Crude Fat (min)", &self.fat),
            ("Crude Fiber (max)", &self.fiber),
            ("Moisture (max)", &self.moisture),
        ]
        .iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label} {v}%")))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionOutcome {
    pub guaranteed_analysis: Option<String>,
    pub ga_strategy: &'static str,
    pub caloric_info: Option<CaloricInfo>,
    pub calories_strategy: &'static str,
}

/// Extract both fields, falling back to the rendered document.
#[must_use]
pub fn extract(ctx: &ExtractionContext<'_>) -> NutritionOutcome {
    let range = &ctx.options.calorie_range;

    let (guaranteed_analysis, ga_strategy) = match parse_guaranteed_analysis(ctx.doc.text()) {
        Some(ga) => (Some(ga), "static_text"),
        None => match ctx.rendered_document().and_then(|d| parse_guaranteed_analysis(d.text())) {
            Some(ga) => (Some(ga), "rendered_dom"),
            None => (None, NONE_SUCCESSFUL),
        },
    };

    let (caloric_info, calories_strategy) = match parse_calories(ctx.doc.text(), range) {
        Some(info) => (Some(info), "static_text"),
        None => match ctx.rendered_document().and_then(|d| parse_calories(d.text(), range)) {
            Some(info) => (Some(info), "rendered_dom"),
            None => (None, NONE_SUCCESSFUL),
        },
    };

    NutritionOutcome {
        guaranteed_analysis: guaranteed_analysis.map(|ga| ga.canonical()),
        ga_strategy,
        caloric_info,
        calories_strategy,
    }
}

/// Text from the first occurrence of `heading` on, or the whole text.
fn section_after<'a>(text: &'a str, heading: &str) -> &'a str {
    let lower = text.to_ascii_lowercase();
    lower.find(heading).map_or(text, |idx| &text[idx..])
}

fn capture_value(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str().to_string())
}

/// Parse the guaranteed analysis, if enough of it is present.
#[must_use]
pub fn parse_guaranteed_analysis(text: &str) -> Option<GuaranteedAnalysis> {
    let section = section_after(text, "guaranteed analysis");
    let parse = |scope: &str| GuaranteedAnalysis {
        protein: capture_value(&GA_PROTEIN, scope),
        fat: capture_value(&GA_FAT, scope),
        fiber: capture_value(&GA_FIBER, scope),
        moisture: capture_value(&GA_MOISTURE, scope),
    };

    let ga = parse(section);
    if ga.is_acceptable() {
        return Some(ga);
    }
    let ga = parse(text);
    ga.is_acceptable().then_some(ga)
}

/// First in-range `N kcal/kg`, with a nearby per-unit figure if present.
#[must_use]
pub fn parse_calories(text: &str, range: &RangeInclusive<u32>) -> Option<CaloricInfo> {
    let section = section_after(text, "calori");

    for scope in [section, text] {
        for caps in KCAL_PER_KG.captures_iter(scope) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.name("value")) else {
                continue;
            };
            let magnitude = value.as_str().replace(',', "").parse::<f64>().ok();
            // Truncation is fine: the range check only needs whole kcal.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let in_range = magnitude.is_some_and(|m| m >= 0.0 && range.contains(&(m as u32)));
            if !in_range {
                continue;
            }

            let window_end = (whole.end() + PER_UNIT_WINDOW).min(scope.len());
            let per_unit = scope
                .get(whole.end()..window_end)
                .and_then(|window| KCAL_PER_UNIT.captures(window))
                .and_then(|u| {
                    let amount = u.name("value")?.as_str();
                    let unit = u.name("unit")?.as_str().to_lowercase();
                    Some(format!("{amount} kcal/{unit}"))
                });

            return Some(CaloricInfo {
                calories: format!("{} kcal/kg", value.as_str()),
                per_unit,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_analysis_in_canonical_order() {
        let text = "GUARANTEED ANALYSIS\nMoisture (max) 10.0%\nCrude Protein (min) 26.0%\n\
                    Crude Fat (min) 15.0%\nCrude Fiber (max) 4.0%";
        let ga = parse_guaranteed_analysis(text).map(|g| g.canonical());
        assert_eq!(
            ga.as_deref(),
            Some("Crude Protein (min) 26.0%, Crude Fat (min) 15.0%, Crude Fiber (max) 4.0%, Moisture (max) 10.0%")
        );
    }

    #[test]
    fn protein_alone_is_not_enough() {
        assert!(parse_guaranteed_analysis("Crude Protein 30%").is_none());
        assert!(parse_guaranteed_analysis("Crude Protein 30%, Moisture 78%").is_some());
    }

    #[test]
    fn calories_with_grouping_and_per_unit() {
        let info = parse_calories(
            "Calorie Content: 3,612 kcal/kg, 394 kcal/cup (calculated)",
            &(500..=6000),
        );
        assert_eq!(
            info,
            Some(CaloricInfo {
                calories: "3,612 kcal/kg".to_string(),
                per_unit: Some("394 kcal/cup".to_string()),
            })
        );
    }

    #[test]
    fn out_of_range_calories_are_ignored() {
        assert!(parse_calories("12 kcal/kg", &(500..=6000)).is_none());
        assert!(parse_calories("90000 kcal/kg", &(500..=6000)).is_none());
        let info = parse_calories("1,050 kcal/kg, 86 kcal/can", &(500..=6000));
        assert_eq!(info.and_then(|i| i.per_unit).as_deref(), Some("86 kcal/can"));
    }
}
