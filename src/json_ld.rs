//! JSON-LD Product Data
//!
//! Walks every `application/ld+json` script, including `@graph` arrays and
//! nested objects, and ranks the Schema.org objects it finds so product
//! nodes are consulted before offers, breadcrumbs or organizations.

use dom_query::{Document, Selection};
use serde_json::{Map, Value};

use crate::dom;

/// One JSON object found in a JSON-LD script.
#[derive(Debug, Clone)]
pub struct SchemaObject {
    /// Lowercased `@type` values. Empty for untyped objects.
    pub types: Vec<String>,
    pub data: Map<String, Value>,
    /// Higher is more relevant.
    pub importance: i32,
}

impl SchemaObject {
    #[must_use]
    pub fn is_product(&self) -> bool {
        self.types.iter().any(|t| is_product_type(t))
    }
}

/// Every schema object in a document, most relevant first.
#[derive(Debug, Clone, Default)]
pub struct JsonLd {
    objects: Vec<SchemaObject>,
}

impl JsonLd {
    /// Parse all JSON-LD scripts. Malformed scripts are skipped.
    #[must_use]
    pub fn collect(doc: &Document) -> Self {
        let mut objects = Vec::new();

        for script in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
            let script_sel = Selection::from(*script);
            let json_text = dom::text_content(&script_sel).trim().to_string();

            if json_text.is_empty() {
                continue;
            }

            let data: Value = match serde_json::from_str(&json_text) {
                Ok(v) => v,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping malformed JSON-LD script");
                    continue;
                }
            };

            process_schema_value(&data, 0, &mut objects);
        }

        // Stable sort keeps document order among equals.
        objects.sort_by(|a, b| b.importance.cmp(&a.importance));

        Self { objects }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Product-typed objects, most relevant first.
    pub fn products(&self) -> impl Iterator<Item = &SchemaObject> {
        self.objects.iter().filter(|o| o.is_product())
    }

    /// `brand` of the best product, else of any object carrying one.
    #[must_use]
    pub fn brand(&self) -> Option<String> {
        self.products()
            .chain(self.objects.iter().filter(|o| !o.is_product()))
            .find_map(|o| o.data.get("brand").and_then(named_value))
    }

    /// `image` of the best product, else of any object carrying one.
    #[must_use]
    pub fn image(&self) -> Option<String> {
        self.products()
            .chain(self.objects.iter().filter(|o| !o.is_product()))
            .find_map(|o| o.data.get("image").and_then(image_value))
    }

    /// `name` of the best product.
    #[must_use]
    pub fn product_name(&self) -> Option<String> {
        self.products()
            .find_map(|o| o.data.get("name").and_then(single_string))
    }

    /// Declared package size of the best product (`weight` or `size`), unnormalized.
    #[must_use]
    pub fn product_size(&self) -> Option<String> {
        self.products().find_map(|o| {
            o.data
                .get("weight")
                .and_then(quantity_value)
                .or_else(|| o.data.get("size").and_then(single_string))
        })
    }
}

/// Recursively collect objects, descending through `@graph` and nested values.
fn process_schema_value(value: &Value, depth: i32, objects: &mut Vec<SchemaObject>) {
    match value {
        Value::Object(map) => {
            let types = schema_types(map);
            let importance = calculate_importance(&types, depth);
            objects.push(SchemaObject {
                types,
                data: map.clone(),
                importance,
            });

            for val in map.values() {
                process_schema_value(val, depth + 1, objects);
            }
        }
        Value::Array(arr) => {
            for item in arr {
                process_schema_value(item, depth, objects);
            }
        }
        _ => {}
    }
}

fn schema_types(obj: &Map<String, Value>) -> Vec<String> {
    match obj.get("@type") {
        Some(Value::String(s)) => vec![s.to_lowercase()],
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_product_type(t: &str) -> bool {
    matches!(t, "product" | "productgroup" | "individualproduct" | "productmodel")
}

fn calculate_importance(types: &[String], depth: i32) -> i32 {
    let base = if types.iter().any(|t| is_product_type(t)) {
        100
    } else if types.is_empty() {
        10
    } else {
        50
    };
    base - depth * 10
}

fn single_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Array(arr) => arr.iter().find_map(single_string),
        _ => None,
    }
}

/// A string, or the `name` of an object (`{"@type": "Brand", "name": ...}`).
fn named_value(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => obj.get("name").and_then(single_string),
        Value::Array(arr) => arr.iter().find_map(named_value),
        other => single_string(other),
    }
}

fn image_value(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => obj
            .get("url")
            .or_else(|| obj.get("contentUrl"))
            .and_then(single_string),
        Value::Array(arr) => arr.iter().find_map(image_value),
        other => single_string(other),
    }
}

/// `{"value": 30, "unitText": "lb"}` / `{"value": 5.5, "unitCode": "ONZ"}` / `"30 lb"`.
fn quantity_value(value: &Value) -> Option<String> {
    let Value::Object(obj) = value else {
        return single_string(value);
    };

    let amount = obj.get("value").and_then(single_string)?;
    let unit = obj
        .get("unitText")
        .and_then(single_string)
        .or_else(|| {
            obj.get("unitCode")
                .and_then(Value::as_str)
                .and_then(unit_from_code)
                .map(str::to_string)
        })?;
    Some(format!("{amount} {unit}"))
}

/// UN/CEFACT common codes used in `unitCode`.
fn unit_from_code(code: &str) -> Option<&'static str> {
    match code.to_ascii_uppercase().as_str() {
        "LBR" => Some("lb"),
        "ONZ" => Some("oz"),
        "KGM" => Some("kg"),
        "GRM" => Some("g"),
        _ => None,
    }
}
