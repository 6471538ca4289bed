//! S-expression plist helpers shared by config files and recordings.
//!
//! Keys may arrive as `Value::Keyword("key")` or `Value::Symbol(":key")`
//! depending on the parser options, so both forms are accepted.

use lexpr::Value;

/// Keyword name of a plist key, without the leading colon.
pub fn key_name(value: &Value) -> Option<&str> {
    match value {
        Value::Keyword(k) => Some(k.as_ref()),
        Value::Symbol(s) => s.strip_prefix(':'),
        _ => None,
    }
}

/// True for every spelling of an empty/false value.
pub fn is_nil(value: &Value) -> bool {
    match value {
        Value::Null | Value::Nil => true,
        Value::Bool(b) => !b,
        Value::Symbol(s) => s.as_ref() == "nil",
        _ => false,
    }
}

/// Value following `:key` in a plist.
/// Walks cons pairs directly to find `:key` followed by its value.
pub fn get_value<'a>(plist: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = plist;
    while let Value::Cons(pair) = current {
        if key_name(pair.car()) == Some(key) {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a floating-point value from a plist.
pub fn get_float(plist: &Value, key: &str) -> Option<f64> {
    get_value(plist, key).and_then(as_f64)
}

pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Key/value pairs of a plist in order.
///
/// Errors name the first entry that is not a keyword or has no value.
pub fn plist_entries(plist: &Value) -> anyhow::Result<Vec<(&str, &Value)>> {
    let mut entries = Vec::new();
    let mut current = plist;
    loop {
        match current {
            Value::Cons(pair) => {
                let key = key_name(pair.car())
                    .ok_or_else(|| anyhow::anyhow!("expected keyword, got {}", pair.car()))?;
                match pair.cdr() {
                    Value::Cons(next) => {
                        entries.push((key, next.car()));
                        current = next.cdr();
                    }
                    _ => anyhow::bail!("missing value for :{}", key),
                }
            }
            Value::Null | Value::Nil => break,
            other => anyhow::bail!("expected plist, got {}", other),
        }
    }
    Ok(entries)
}

/// Elements of a proper list.
pub fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null | Value::Nil => return Some(items),
            _ => return None,
        }
    }
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
