pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Split a result object into scalar fields (nested objects flattened with
/// dotted keys) and row sets (arrays of objects such as yearly rows or
/// scenario tables).
pub(crate) fn partition_result(
    result: &Map<String, Value>,
) -> (Vec<(String, Value)>, Vec<(String, Vec<Value>)>) {
    let mut fields = Vec::new();
    let mut row_sets = Vec::new();
    flatten_into("", result, &mut fields, &mut row_sets);
    (fields, row_sets)
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    fields: &mut Vec<(String, Value)>,
    row_sets: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, fields, row_sets),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                row_sets.push((name, items.clone()));
            }
            _ => fields.push((name, val.clone())),
        }
    }
}
