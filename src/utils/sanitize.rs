use serde_json::Value;

/// Masks credentials and contact details in JSON payloads before logging.
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sanitized = map
                .iter()
                .map(|(key, val)| {
                    let sanitized_val = match field_sensitivity(key) {
                        Sensitivity::Secret => Value::String("****".to_string()),
                        Sensitivity::Partial => mask_value(val),
                        Sensitivity::Public => sanitize_json(val),
                    };
                    (key.clone(), sanitized_val)
                })
                .collect();
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

enum Sensitivity {
    Secret,
    Partial,
    Public,
}

fn field_sensitivity(key: &str) -> Sensitivity {
    match key.to_lowercase().as_str() {
        "password" | "secret" | "token" | "api_key" | "authorization" => Sensitivity::Secret,
        "email" => Sensitivity::Partial,
        _ => Sensitivity::Public,
    }
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > 8 => {
            let chars: Vec<char> = s.chars().collect();
            let visible: String = chars[..4].iter().collect();
            let end: String = chars[chars.len() - 4..].iter().collect();
            Value::String(format!("{}****{}", visible, end))
        }
        _ => Value::String("****".to_string()),
    }
}
