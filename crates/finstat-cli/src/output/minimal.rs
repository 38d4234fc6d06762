use serde_json::Value;

use super::body;

/// Print just the headline answer.
///
/// For an analysis that is the latest year's label and score; otherwise the
/// last risk row, the row count of the first array, or the first field.
pub fn print_minimal(value: &Value) {
    let result = body(value);

    if let Some(latest) = result.get("latest").filter(|v| !v.is_null()) {
        println!("{}", headline(latest));
        return;
    }

    if let Some(Value::Array(risks)) = result.get("risks") {
        match risks.last() {
            Some(last) => println!("{}", headline(last)),
            None => println!("null"),
        }
        return;
    }

    if let Value::Object(map) = result {
        if let Some((key, val)) = map.iter().next() {
            match val {
                Value::Array(arr) => println!("{}: {}", key, arr.len()),
                _ => println!("{}: {}", key, format_minimal(val)),
            }
            return;
        }
    }

    println!("{}", format_minimal(result));
}

/// "2023 Medium 35"
fn headline(assessment: &Value) -> String {
    let field = |k: &str| {
        assessment
            .get(k)
            .map(format_minimal)
            .unwrap_or_else(|| "null".to_string())
    };
    format!("{} {} {}", field("year"), field("label"), field("score"))
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
