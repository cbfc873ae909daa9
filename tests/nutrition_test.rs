use petfood_extract::{extract, extract_with_options, CaloricInfo, Field, Options, NONE_SUCCESSFUL};

const PANEL: &str = r#"<html><body>
    <h2>Guaranteed Analysis</h2>
    <table>
      <tr><td>Crude Protein</td><td>26.0% min</td></tr>
      <tr><td>Crude Fat</td><td>16.0% min</td></tr>
      <tr><td>Crude Fiber</td><td>4.5% max</td></tr>
      <tr><td>Moisture</td><td>10.0% max</td></tr>
    </table>
    <h2>Calorie Content</h2>
    <p>3,710 kcal/kg, 408 kcal/cup (calculated)</p>
    </body></html>"#;

#[test]
fn table_panel_is_canonicalized() {
    let record = extract(PANEL, "https://example.com/p");
    assert_eq!(
        record.guaranteed_analysis.as_deref(),
        Some("Crude Protein (min) 26.0%, Crude Fat (min) 16.0%, Crude Fiber (max) 4.5%, Moisture (max) 10.0%")
    );
    assert_eq!(record.extraction_trace.strategy(Field::GuaranteedAnalysis), Some("static_text"));
}

#[test]
fn calories_keep_per_unit_figure() {
    let record = extract(PANEL, "https://example.com/p");
    assert_eq!(
        record.caloric_info,
        Some(CaloricInfo {
            calories: "3,710 kcal/kg".to_string(),
            per_unit: Some("408 kcal/cup".to_string()),
        })
    );
}

#[test]
fn calorie_range_is_configurable() {
    let options = Options {
        calorie_range: 4000..=6000,
        ..Options::default()
    };
    let record = extract_with_options(PANEL, "https://example.com/p", &options);
    assert_eq!(record.caloric_info, None);
    assert_eq!(record.extraction_trace.strategy(Field::Calories), Some(NONE_SUCCESSFUL));
}

#[test]
fn missing_panel_leaves_fields_empty() {
    let record = extract("<html><body><p>Crude Protein 30%</p></body></html>", "https://example.com/p");
    assert_eq!(record.guaranteed_analysis, None);
    assert_eq!(record.caloric_info, None);
}
