use serde_json::Value;
use shared::error::DocumentError;

use crate::raw::{JsonActionValue, JsonCategory, JsonDocument, OrderedEntries};

type RawCategories = OrderedEntries<OrderedEntries<Value>>;

pub fn parse(source: &str) -> Result<JsonDocument, DocumentError> {
    let raw: RawCategories =
        serde_json::from_str(source).map_err(|e| DocumentError::Json(e.to_string()))?;

    let mut categories = Vec::with_capacity(raw.0.len());
    for (category, actions) in raw.0 {
        let mut resolved = Vec::with_capacity(actions.0.len());
        for (action, value) in actions.0 {
            let value = JsonActionValue::from_value(&category, &action, value)?;
            resolved.push((action, value));
        }
        categories.push(JsonCategory {
            name: category,
            actions: resolved,
        });
    }

    Ok(JsonDocument { categories })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_document_order_and_duplicates() {
        let doc = parse(
            r#"{
                "Zeta": {"b": "shell b", "a": "shell a"},
                "Alpha": {"x": ["one", "two"]},
                "Zeta": {"c": {"commands": "shell c"}}
            }"#,
        )
        .expect("parse");

        let names: Vec<_> = doc.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Zeta"]);
        let first: Vec<_> = doc.categories[0]
            .actions
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(first, vec!["b", "a"]);
    }

    #[test]
    fn resolves_each_action_shape() {
        let doc = parse(
            r#"{"T": {
                "single": "reboot",
                "list": ["shell a", "shell b"],
                "detailed": {"commands": ["shell c"], "show": "TRUE"},
                "detailed_single": {"commands": "shell d"},
                "no_commands": {"show": "true"}
            }}"#,
        )
        .expect("parse");

        let actions = &doc.categories[0].actions;
        assert_eq!(actions[0].1, JsonActionValue::Single("reboot".into()));
        assert_eq!(
            actions[1].1,
            JsonActionValue::List(vec!["shell a".into(), "shell b".into()])
        );
        assert_eq!(
            actions[2].1,
            JsonActionValue::Detailed {
                commands: vec!["shell c".into()],
                show: Some(Value::String("TRUE".into())),
            }
        );
        assert_eq!(
            actions[3].1,
            JsonActionValue::Detailed {
                commands: vec!["shell d".into()],
                show: None,
            }
        );
        assert_eq!(
            actions[4].1,
            JsonActionValue::Detailed {
                commands: Vec::new(),
                show: Some(Value::String("true".into())),
            }
        );
    }

    #[test]
    fn rejects_unsupported_shapes_with_location() {
        let err = parse(r#"{"T": {"bad": 42}}"#).expect_err("number action");
        assert!(err.to_string().contains("action 'bad' in category 'T'"));

        let err = parse(r#"{"T": {"bad": ["ok", 1]}}"#).expect_err("mixed list");
        assert!(err.to_string().contains("command [1]"));

        assert!(parse(r#"{"T": "not an object"}"#).is_err());
        assert!(parse(r#"["T"]"#).is_err());
        assert!(parse(r#"{"T": {"a": "x"}"#).is_err());
    }
}
