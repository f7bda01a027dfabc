//! Template interpolation against a whitelisted variable bag.
//!
//! Placeholders are `{{name}}` or `{{name.path}}`. Identifier roots are
//! inserted verbatim after validation; value roots are rendered as escaped
//! SQL literals. Every placeholder is validated before anything is
//! rendered, so a bad template never yields partial output.

use serde_json::{Map, Value};

use crate::error::CheckError;

/// Roots inserted verbatim as identifiers.
const IDENTIFIER_ROOTS: [&str; 3] = ["schema", "table", "column"];

/// Roots rendered as literals.
const VALUE_ROOTS: [&str; 2] = ["schemas", "threshold"];

/// Only `threshold` may be indexed with a dotted path.
const NESTED_ROOT: &str = "threshold";

#[derive(Debug)]
struct Placeholder<'t> {
    start: usize,
    end: usize,
    path: Vec<&'t str>,
}

impl Placeholder<'_> {
    fn root(&self) -> &str {
        self.path[0]
    }

    fn name(&self) -> String {
        self.path.join(".")
    }
}

/// Expand `template` against `vars`.
///
/// # Errors
///
/// `UnsafePlaceholder` for anything outside the whitelist (checked for all
/// placeholders first), then `MissingVariable` or `InvalidIdentifier` while
/// rendering.
pub fn interpolate(template: &str, vars: &Map<String, Value>) -> Result<String, CheckError> {
    let placeholders = scan(template)?;
    for placeholder in &placeholders {
        validate(placeholder)?;
    }

    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    for placeholder in &placeholders {
        out.push_str(&template[cursor..placeholder.start]);
        out.push_str(&render(placeholder, vars)?);
        cursor = placeholder.end;
    }
    out.push_str(&template[cursor..]);
    Ok(out)
}

fn scan(template: &str) -> Result<Vec<Placeholder<'_>>, CheckError> {
    let mut found = Vec::new();
    let mut offset = 0;
    while let Some(rel) = template[offset..].find("{{") {
        let start = offset + rel;
        let body_start = start + 2;
        let Some(close) = template[body_start..].find("}}") else {
            return Err(CheckError::UnsafePlaceholder(template[start..].to_string()));
        };
        let end = body_start + close + 2;
        let body = template[body_start..body_start + close].trim();

        let path: Vec<&str> = body.split('.').collect();
        let well_formed = path.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
        if !well_formed {
            return Err(CheckError::UnsafePlaceholder(body.to_string()));
        }

        found.push(Placeholder { start, end, path });
        offset = end;
    }
    Ok(found)
}

fn validate(placeholder: &Placeholder<'_>) -> Result<(), CheckError> {
    let root = placeholder.root();
    let known = IDENTIFIER_ROOTS.contains(&root) || VALUE_ROOTS.contains(&root);
    let nested_ok = placeholder.path.len() == 1 || root == NESTED_ROOT;
    if known && nested_ok {
        Ok(())
    } else {
        Err(CheckError::UnsafePlaceholder(placeholder.name()))
    }
}

fn lookup<'v>(placeholder: &Placeholder<'_>, vars: &'v Map<String, Value>) -> Option<&'v Value> {
    let mut value = vars.get(placeholder.root())?;
    for segment in &placeholder.path[1..] {
        value = value.as_object()?.get(*segment)?;
    }
    (!value.is_null()).then_some(value)
}

fn render(placeholder: &Placeholder<'_>, vars: &Map<String, Value>) -> Result<String, CheckError> {
    let value =
        lookup(placeholder, vars).ok_or_else(|| CheckError::MissingVariable(placeholder.name()))?;

    if IDENTIFIER_ROOTS.contains(&placeholder.root()) {
        identifier(&placeholder.name(), value)
    } else {
        Ok(literal(value))
    }
}

fn identifier(name: &str, value: &Value) -> Result<String, CheckError> {
    let invalid = || CheckError::InvalidIdentifier {
        name: name.to_string(),
        value: value.to_string(),
    };
    let text = value.as_str().ok_or_else(invalid)?;
    let valid = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid { Ok(text.to_string()) } else { Err(invalid()) }
}

/// Quote `s` as a SQL string literal, doubling embedded quotes.
#[must_use]
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote `s` as a SQL identifier, doubling embedded double quotes.
#[must_use]
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_literal(s),
        Value::Array(items) => items.iter().map(literal).collect::<Vec<_>>().join(", "),
        Value::Object(_) => quote_literal(&value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test vars must be an object"),
        }
    }

    #[test]
    fn expands_identifiers_and_values() {
        let bag = vars(json!({
            "schema": "public",
            "table": "users",
            "schemas": ["public", "billing"],
            "threshold": { "max": 10, "label": "O'Brien" }
        }));
        let sql = interpolate(
            "SELECT * FROM {{ schema }}.{{table}} WHERE n > {{threshold.max}} \
             AND label = {{threshold.label}} AND s IN ({{schemas}})",
            &bag,
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM public.users WHERE n > 10 AND label = 'O''Brien' \
             AND s IN ('public', 'billing')"
        );
        assert!(!sql.contains("{{"));
    }

    #[rstest]
    #[case(json!(true), "TRUE")]
    #[case(json!(false), "FALSE")]
    #[case(json!(2.5), "2.5")]
    #[case(json!("x"), "'x'")]
    #[case(json!([1, "a", null]), "1, 'a', NULL")]
    #[case(json!({"k": "v"}), r#"'{"k":"v"}'"#)]
    fn renders_value_literals(#[case] threshold: Value, #[case] expected: &str) {
        let bag = vars(json!({ "threshold": threshold }));
        assert_eq!(interpolate("{{threshold}}", &bag).unwrap(), expected);
    }

    #[rstest]
    #[case("{{password}}")]
    #[case("{{schema.name}}")]
    #[case("{{ table; DROP }}")]
    #[case("{{}}")]
    #[case("SELECT {{table")]
    fn rejects_unsafe_placeholders(#[case] template: &str) {
        let bag = vars(json!({ "schema": "public", "table": "users", "password": "x" }));
        assert!(matches!(
            interpolate(template, &bag),
            Err(CheckError::UnsafePlaceholder(_))
        ));
    }

    #[test]
    fn unsafe_placeholder_wins_over_earlier_missing_variable() {
        let bag = vars(json!({}));
        let err = interpolate("{{table}} {{secret}}", &bag).unwrap_err();
        assert_eq!(err, CheckError::UnsafePlaceholder("secret".into()));
    }

    #[test]
    fn null_and_absent_are_missing() {
        let bag = vars(json!({ "table": null, "threshold": {} }));
        assert_eq!(
            interpolate("{{table}}", &bag).unwrap_err(),
            CheckError::MissingVariable("table".into())
        );
        assert_eq!(
            interpolate("{{threshold.max}}", &bag).unwrap_err(),
            CheckError::MissingVariable("threshold.max".into())
        );
        assert_eq!(
            interpolate("{{column}}", &bag).unwrap_err(),
            CheckError::MissingVariable("column".into())
        );
    }

    #[rstest]
    #[case(json!("users; DROP TABLE x"))]
    #[case(json!("user name"))]
    #[case(json!("\"quoted\""))]
    #[case(json!(""))]
    #[case(json!(42))]
    fn rejects_invalid_identifiers(#[case] table: Value) {
        let bag = vars(json!({ "table": table }));
        assert!(matches!(
            interpolate("SELECT * FROM {{table}}", &bag),
            Err(CheckError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn identifier_allows_dots_and_dashes() {
        let bag = vars(json!({ "table": "sales.order-lines_2024" }));
        assert_eq!(
            interpolate("{{table}}", &bag).unwrap(),
            "sales.order-lines_2024"
        );
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        let sql = "SELECT 1 WHERE '{' = '{'";
        assert_eq!(interpolate(sql, &Map::new()).unwrap(), sql);
    }

    #[test]
    fn quoting_helpers_double_delimiters() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
