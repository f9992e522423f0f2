//! JSON documents → pretty trees.
//!
//! Objects become records (the `type_key` entry, when present, names the
//! record and is dropped from its fields). Key order is kept as read.
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::PrettyError;
use crate::value::{Array, Color, Leaf, PrettyValue, Record};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JsonWalker {
    /// Object key whose string value becomes the record's type name.
    pub type_key: String,
    /// Print small all-scalar objects positionally.
    pub abbreviate: bool,
    pub abbreviate_max_fields: usize,
}

impl Default for JsonWalker {
    fn default() -> Self {
        Self {
            type_key: "_type".to_string(),
            abbreviate: false,
            abbreviate_max_fields: 3,
        }
    }
}

/// Strings become leaves, null becomes the absent leaf, anything else is
/// rejected.
pub fn leaf_from_json(value: &Value, color: Color) -> Result<Leaf, PrettyError> {
    match value {
        Value::Null => Ok(Leaf::absent()),
        Value::String(text) => Leaf::new(text.as_str(), color),
        other => Err(PrettyError::InvalidLeafInput {
            found: format!("expected string or null, found {}", json_kind(other)),
        }),
    }
}

impl JsonWalker {
    pub fn walk<'a>(&self, value: &Value) -> Result<PrettyValue<'a>, PrettyError> {
        match value {
            Value::Null | Value::String(_) => {
                leaf_from_json(value, Color::StringConst).map(PrettyValue::Leaf)
            }
            Value::Bool(b) => Ok(Leaf::other_const(b.to_string()).into()),
            Value::Number(n) => Ok(Leaf::other_const(n.to_string()).into()),
            Value::Array(xs) => {
                let mut array = Array::with_capacity(xs.len());
                for x in xs {
                    array.push(self.walk(x)?);
                }
                Ok(array.into())
            }
            Value::Object(map) => self.walk_object(map).map(PrettyValue::Record),
        }
    }

    fn walk_object<'a>(&self, map: &Map<String, Value>) -> Result<Record<'a>, PrettyError> {
        let type_name = match map.get(&self.type_key) {
            Some(raw) => {
                let leaf = leaf_from_json(raw, Color::TypeName)?;
                if leaf.is_absent() { String::new() } else { leaf.text().to_string() }
            }
            None => String::new(),
        };
        let fields = map.iter().filter(|(key, _)| **key != self.type_key);

        if self.should_abbreviate(map) {
            tracing::trace!(type_name = type_name.as_str(), "abbreviating object");
            let mut record = Record::abbreviated(type_name, "(", ")");
            for (_, value) in fields {
                record.add_unnamed_child(self.walk(value)?)?;
            }
            return Ok(record);
        }

        let mut record = Record::new(type_name);
        for (key, value) in fields {
            record.add_field(key.as_str(), self.walk(value)?)?;
        }
        Ok(record)
    }

    fn should_abbreviate(&self, map: &Map<String, Value>) -> bool {
        if !self.abbreviate {
            return false;
        }
        let mut count = 0;
        for (key, value) in map {
            if *key == self.type_key {
                continue;
            }
            if matches!(value, Value::Array(_) | Value::Object(_)) {
                return false;
            }
            count += 1;
        }
        (1..=self.abbreviate_max_fields).contains(&count)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderOptions, render};
    use serde_json::json;

    fn walk_and_render(walker: &JsonWalker, value: Value) -> String {
        let tree = walker.walk(&value).unwrap();
        render(&tree, &RenderOptions::default())
    }

    #[test]
    fn type_key_names_the_record_and_order_is_kept() {
        let doc = json!({"_type": "BinOp", "op": "+", "left": 1, "right": 2});
        assert_eq!(
            walk_and_render(&JsonWalker::default(), doc),
            "(BinOp op:+ left:1 right:2)"
        );
    }

    #[test]
    fn scalars_nulls_and_nesting() {
        let doc = json!({
            "name": "two words",
            "ok": true,
            "missing": null,
            "xs": [],
            "inner": {"_type": null}
        });
        assert_eq!(
            walk_and_render(&JsonWalker::default(), doc),
            "(name:'two words' ok:true missing:_ xs:[] inner:())"
        );
    }

    #[test]
    fn abbreviates_small_scalar_objects() {
        let walker = JsonWalker { abbreviate: true, ..JsonWalker::default() };
        let doc = json!([
            {"_type": "Point", "x": 1, "y": 2},
            {"_type": "Line", "from": {"x": 0}, "to": {"x": 1}},
            {"_type": "Wide", "a": 1, "b": 2, "c": 3, "d": 4},
            {"_type": "Bare"}
        ]);
        assert_eq!(
            walk_and_render(&walker, doc),
            "[(Point 1 2) (Line from:(0) to:(1)) (Wide a:1 b:2 c:3 d:4) (Bare)]"
        );
    }

    #[test]
    fn custom_type_key() {
        let walker = JsonWalker { type_key: "kind".into(), ..JsonWalker::default() };
        let tree = walker.walk(&json!({"kind": "Var", "_type": "x"})).unwrap();
        let record = tree.as_record().unwrap();
        assert_eq!(record.type_name(), "Var");
        assert_eq!(record.fields()[0].name, "_type");
    }

    #[test]
    fn non_string_type_name_is_rejected() {
        let err = JsonWalker::default().walk(&json!({"_type": 5})).unwrap_err();
        assert_eq!(
            err,
            PrettyError::InvalidLeafInput { found: "expected string or null, found number".into() }
        );
    }

    #[test]
    fn leaf_from_json_accepts_only_strings_and_null() {
        assert!(leaf_from_json(&json!(null), Color::UserType).unwrap().is_absent());
        let leaf = leaf_from_json(&json!("Id.Op"), Color::UserType).unwrap();
        assert_eq!(leaf.color(), Color::UserType);
        assert!(leaf_from_json(&json!([1]), Color::StringConst).is_err());
        assert!(leaf_from_json(&json!("x"), Color::External).is_err());
    }
}
