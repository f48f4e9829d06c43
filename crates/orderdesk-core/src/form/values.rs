//! Conversion between dotted-path value maps and nested JSON values.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::descriptor::FieldDescriptor;

/// Ordered mapping of dotted field path to collected value.
pub type FlatValues = IndexMap<String, Value>;

/// Rebuilds a nested JSON object from dotted paths.
///
/// `{"a.b": 1, "c": 2}` becomes `{"a": {"b": 1}, "c": 2}`. A later path that
/// needs an object where a scalar was already written replaces the scalar.
pub fn unflatten(flat: &FlatValues) -> Value {
    let mut root = Map::new();
    for (path, value) in flat {
        let mut segments = path.split('.').peekable();
        let mut current = &mut root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), value.clone());
                break;
            }
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(map) = slot.as_object_mut() else {
                break;
            };
            current = map;
        }
    }
    Value::Object(root)
}

/// Flattens `value` to the dotted paths named by `descriptors`.
///
/// Paths missing from `value` are left out, so flattening a partially filled
/// entity yields only what is present.
pub fn flatten(value: &Value, descriptors: &[FieldDescriptor]) -> FlatValues {
    descriptors
        .iter()
        .filter_map(|d| lookup(value, &d.path).map(|v| (d.path.clone(), v.clone())))
        .collect()
}

/// Reads the value at a dotted path.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| current.get(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::descriptor::DescriptorKind;
    use serde_json::json;

    fn descriptor(path: &str, kind: DescriptorKind) -> FieldDescriptor {
        FieldDescriptor {
            path: path.to_string(),
            prompt: path.to_string(),
            kind,
        }
    }

    #[test]
    fn test_unflatten_builds_nested_objects() {
        let mut flat = FlatValues::new();
        flat.insert("customer.name".into(), json!("Ann"));
        flat.insert("customer.phone".into(), Value::Null);
        flat.insert("items".into(), json!(["a", "b"]));

        assert_eq!(
            unflatten(&flat),
            json!({"customer": {"name": "Ann", "phone": null}, "items": ["a", "b"]})
        );
    }

    #[test]
    fn test_unflatten_nested_path_replaces_scalar() {
        let mut flat = FlatValues::new();
        flat.insert("customer".into(), json!("Ann"));
        flat.insert("customer.name".into(), json!("Bea"));

        assert_eq!(unflatten(&flat), json!({"customer": {"name": "Bea"}}));
    }

    #[test]
    fn test_unflatten_empty_map_is_empty_object() {
        assert_eq!(unflatten(&FlatValues::new()), json!({}));
    }

    #[test]
    fn test_flatten_skips_missing_paths() {
        let value = json!({"customer": {"name": "Ann"}, "items": []});
        let descriptors = vec![
            descriptor("customer.name", DescriptorKind::Scalar),
            descriptor("customer.phone", DescriptorKind::Scalar),
            descriptor("items", DescriptorKind::ListOfScalar),
        ];

        let flat = flatten(&value, &descriptors);
        let keys: Vec<_> = flat.keys().cloned().collect();
        assert_eq!(keys, vec!["customer.name", "items"]);
    }

    #[test]
    fn test_lookup_walks_dotted_path() {
        let value = json!({"a": {"b": {"c": 3}}});
        assert_eq!(lookup(&value, "a.b.c"), Some(&json!(3)));
        assert_eq!(lookup(&value, "a.x"), None);
    }
}
