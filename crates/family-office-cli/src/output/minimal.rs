use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Looks up well-known result paths in priority order, then falls back to
/// the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(val) = pick_key_value(result_obj) {
        println!("{}", format_minimal(val));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

/// Dotted paths of the headline figure of each command.
const PRIORITY_PATHS: [&str; 10] = [
    "best_strategy",
    "best_case",
    "totals.total_tax",
    "tax_due",
    "total_tax",
    "shareholder_tax",
    "tax",
    "claim_outside_estate.effect",
    "effect",
    "gifting_effect",
];

fn pick_key_value(result: &Value) -> Option<&Value> {
    PRIORITY_PATHS.iter().find_map(|path| {
        path.split('.')
            .try_fold(result, |node, key| node.get(key))
            .filter(|val| !val.is_null())
    })
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_priority_path() {
        let result = json!({"per_year": [], "totals": {"total_tax": "123"}});
        assert_eq!(pick_key_value(&result), Some(&json!("123")));
    }

    #[test]
    fn test_best_strategy_beats_other_fields() {
        let result = json!({"total_gifted": "0", "best_strategy": "trust_transfer"});
        assert_eq!(pick_key_value(&result), Some(&json!("trust_transfer")));
    }

    #[test]
    fn test_no_known_field() {
        assert_eq!(pick_key_value(&json!({"other": 1})), None);
    }
}
