use serde_json::Value;

/// Print just the key answer from the output.
///
/// A deal analysis prints `<score> <verdict>`; other commands print the first
/// well-known field present, then fall back to the first field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", minimal_line(result_obj));
}

fn minimal_line(result: &Value) -> String {
    let priority_keys = [
        "dealScore",
        "monthlyPayment",
        "baseCaseValue",
        "monthlyCashFlow",
    ];

    let Value::Object(map) = result else {
        return format_minimal(result);
    };

    let score = map
        .get("metrics")
        .and_then(|m| m.get("dealScore"))
        .or_else(|| map.get("dealScore"));
    if let (Some(score), Some(verdict)) = (score, map.get("verdict")) {
        return format!("{} {}", format_minimal(score), format_minimal(verdict));
    }

    for key in &priority_keys {
        if let Some(val) = map.get(*key) {
            if !val.is_null() {
                return format_minimal(val);
            }
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_minimal(val)),
        None => String::new(),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "N/A".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analysis_prints_score_and_verdict() {
        let out = json!({ "metrics": { "dealScore": 84 }, "verdict": "strong-buy" });
        assert_eq!(minimal_line(&out), "84 strong-buy");
    }

    #[test]
    fn test_payment_prints_value() {
        let out = json!({ "principal": "220000", "monthlyPayment": "1538.27" });
        assert_eq!(minimal_line(&out), "1538.27");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let out = json!({ "year": 1 });
        assert_eq!(minimal_line(&out), "year: 1");
    }
}
