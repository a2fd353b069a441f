// file: src/retriever/filter.rs
// description: where filters, nearText arguments and GraphQL Get query rendering
// reference: https://weaviate.io/developers/weaviate/api/graphql/filters

use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    And,
    Equal,
    ContainsAny,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    TextList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operand {
    pub path: Vec<String>,
    pub operator: Operator,
    pub value_text: FilterValue,
}

impl Operand {
    pub fn equal(property: &str, value: impl Into<String>) -> Self {
        Self {
            path: vec![property.to_string()],
            operator: Operator::Equal,
            value_text: FilterValue::Text(value.into()),
        }
    }

    pub fn contains_any(property: &str, values: Vec<String>) -> Self {
        Self {
            path: vec![property.to_string()],
            operator: Operator::ContainsAny,
            value_text: FilterValue::TextList(values),
        }
    }
}

/// Conjunction of property filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhereFilter {
    pub operator: Operator,
    pub operands: Vec<Operand>,
}

impl Default for WhereFilter {
    fn default() -> Self {
        Self {
            operator: Operator::And,
            operands: Vec::new(),
        }
    }
}

impl WhereFilter {
    pub fn push(&mut self, operand: Operand) {
        self.operands.push(operand);
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movement {
    pub concepts: Vec<String>,
    pub force: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearText {
    pub concepts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_to: Option<Movement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_away_from: Option<Movement>,
}

impl NearText {
    pub fn new(concept: impl Into<String>) -> Self {
        Self {
            concepts: vec![concept.into()],
            distance: None,
            move_to: None,
            move_away_from: None,
        }
    }
}

/// A `Get` query over one class.
#[derive(Debug, Clone, PartialEq)]
pub struct GetQuery {
    pub class_name: String,
    pub fields: Vec<String>,
    pub additional: Vec<String>,
    pub where_filter: Option<WhereFilter>,
    pub near_text: Option<NearText>,
    pub limit: Option<usize>,
}

impl GetQuery {
    pub fn new(class_name: &str, fields: &[&str]) -> Self {
        Self {
            class_name: class_name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            additional: Vec::new(),
            where_filter: None,
            near_text: None,
            limit: None,
        }
    }

    pub fn with_additional(mut self, fields: &[&str]) -> Self {
        self.additional = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_where(mut self, filter: WhereFilter) -> Self {
        self.where_filter = Some(filter);
        self
    }

    pub fn with_near_text(mut self, near_text: NearText) -> Self {
        self.near_text = Some(near_text);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(&self) -> String {
        let mut args = Vec::new();

        if let Some(filter) = &self.where_filter {
            args.push(format!("where: {}", to_graphql(&to_value(filter))));
        }
        if let Some(near_text) = &self.near_text {
            args.push(format!("nearText: {}", to_graphql(&to_value(near_text))));
        }
        if let Some(limit) = self.limit {
            args.push(format!("limit: {}", limit));
        }

        let mut selection = self.fields.join(" ");
        if !self.additional.is_empty() {
            let _ = write!(selection, " _additional {{ {} }}", self.additional.join(" "));
        }

        let args = if args.is_empty() {
            String::new()
        } else {
            format!("({})", args.join(", "))
        };

        format!(
            "{{ Get {{ {}{} {{ {} }} }} }}",
            self.class_name,
            args,
            selection.trim()
        )
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Render a JSON value as a GraphQL input value.
///
/// Object keys are bare names, strings keep JSON escaping, and the value of
/// any `operator` key is emitted as an enum literal.
pub fn to_graphql(value: &Value) -> String {
    let mut out = String::new();
    render(value, false, &mut out);
    out
}

fn render(value: &Value, as_enum: bool, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) if as_enum => out.push_str(s),
        Value::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render(item, false, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                render(item, key == "operator", out);
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_operand_serialization() {
        assert_eq!(
            to_value(&Operand::equal("topic", "covid")),
            json!({"path": ["topic"], "operator": "Equal", "valueText": "covid"})
        );
        assert_eq!(
            to_value(&Operand::contains_any("paper_id", vec!["a".into(), "b".into()])),
            json!({"path": ["paper_id"], "operator": "ContainsAny", "valueText": ["a", "b"]})
        );
    }

    #[test]
    fn test_near_text_skips_unset() {
        let mut near_text = NearText::new("q");
        assert_eq!(to_value(&near_text), json!({"concepts": ["q"]}));

        near_text.distance = Some(0.3);
        near_text.move_to = Some(Movement {
            concepts: vec!["x".into()],
            force: 0.5,
        });
        assert_eq!(
            to_value(&near_text),
            json!({"concepts": ["q"], "distance": 0.3, "moveTo": {"concepts": ["x"], "force": 0.5}})
        );
    }

    #[test]
    fn test_graphql_enum_and_escaping() {
        let value = json!({"operator": "Equal", "valueText": "say \"hi\""});
        let rendered = to_graphql(&value);
        assert!(rendered.contains("operator: Equal"));
        assert!(rendered.contains(r#"valueText: "say \"hi\"""#));
    }

    #[test]
    fn test_build_minimal() {
        let query = GetQuery::new("Passage", &["paper_id", "text_content"]);
        assert_eq!(query.build(), "{ Get { Passage { paper_id text_content } } }");
    }

    #[test]
    fn test_build_full() {
        let mut filter = WhereFilter::default();
        filter.push(Operand::equal("topic", "covid"));

        let query = GetQuery::new("Passage", &["paper_id"])
            .with_additional(&["distance"])
            .with_where(filter)
            .with_near_text(NearText::new("masks"))
            .with_limit(5)
            .build();

        assert!(query.starts_with("{ Get { Passage(where: {"));
        assert!(query.contains("operator: And"));
        assert!(query.contains(r#"path: ["topic"]"#));
        assert!(query.contains(r#"nearText: {concepts: ["masks"]}"#));
        assert!(query.contains("limit: 5)"));
        assert!(query.ends_with("{ paper_id _additional { distance } } } }"));
    }
}
