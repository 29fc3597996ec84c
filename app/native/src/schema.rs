use crate::config::Config;

/// Public location of the published schema.
pub const SCHEMA_ID: &str = "https://raw.githubusercontent.com/aurea-rs/aurea/main/aurea.schema.json";

/// Generates a JSON Schema for the Aurea configuration.
///
/// The schema includes all file-settable options with their types,
/// descriptions, and default values.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(Config);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Generates a pretty-printed JSON Schema string for the Aurea configuration.
#[must_use]
pub fn generate_schema_json() -> String {
    let schema = generate_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
