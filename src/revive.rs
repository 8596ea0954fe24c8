//! Post-parse transform ("reviver") walk.
//!
//! The walk matches `JSON.parse` revival order: children are revived before
//! their parent, object members are visited with their key, array elements
//! with their decimal index, and the root last with the empty key.

use serde_json::Value;

/// Caller-supplied transform.  Returning `None` drops an object member; a
/// dropped array element or root becomes `null`.
pub type Reviver<'r> = &'r dyn Fn(&str, Value) -> Option<Value>;

/// Apply `reviver` to every key/value pair of `value`, bottom-up.
pub fn revive(value: Value, reviver: Reviver<'_>) -> Value {
    walk("", value, reviver).unwrap_or(Value::Null)
}

fn walk(key: &str, value: Value, reviver: Reviver<'_>) -> Option<Value> {
    let value = match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter_map(|(k, v)| walk(&k, v, reviver).map(|v| (k, v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| walk(&i.to_string(), v, reviver).unwrap_or(Value::Null))
                .collect(),
        ),
        other => other,
    };
    reviver(key, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn visits_children_before_parents() {
        let seen = RefCell::new(Vec::new());
        let reviver = |k: &str, v: Value| {
            seen.borrow_mut().push(k.to_string());
            Some(v)
        };
        let v = json!({"a": {"b": 1}, "c": [true]});
        assert_eq!(revive(v.clone(), &reviver), v);
        assert_eq!(*seen.borrow(), vec!["b", "a", "0", "c", ""]);
    }

    #[test]
    fn none_drops_members_and_nulls_elements() {
        let reviver = |k: &str, v: Value| if k == "secret" || k == "1" { None } else { Some(v) };
        let v = json!({"keep": [1, 2, 3], "secret": "x"});
        assert_eq!(revive(v, &reviver), json!({"keep": [1, null, 3]}));
    }

    #[test]
    fn values_can_be_rewritten() {
        let reviver = |_: &str, v: Value| match v.as_i64() {
            Some(n) => Some(json!(n * 10)),
            None    => Some(v),
        };
        assert_eq!(revive(json!({"n": 4, "m": [1]}), &reviver), json!({"n": 40, "m": [10]}));
    }

    #[test]
    fn dropping_the_root_yields_null() {
        assert_eq!(revive(json!({"a": 1}), &|k: &str, v: Value| (!k.is_empty()).then_some(v)), Value::Null);
    }
}
