//! Postgres array literals (`{a,"b c",NULL}`).
//!
//! Text-format array values arrive from the target in this form, and
//! operator queries often return column lists as `array_agg(...)`.

/// Parse a one-dimensional array literal. `NULL` elements become `None`.
///
/// Returns `None` for anything that is not a well-formed one-dimensional
/// literal.
#[must_use]
pub fn parse_array_literal(input: &str) -> Option<Vec<Option<String>>> {
    let inner = input.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut elements = Vec::new();
    if inner.trim().is_empty() {
        return Some(elements);
    }

    let mut chars = inner.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        if chars.next_if_eq(&'"').is_some() {
            let mut value = String::new();
            loop {
                match chars.next()? {
                    '\\' => value.push(chars.next()?),
                    '"' => break,
                    c => value.push(c),
                }
            }
            elements.push(Some(value));
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
        } else {
            let mut value = String::new();
            while let Some(c) = chars.next_if(|c| *c != ',') {
                if c == '{' || c == '}' || c == '"' {
                    return None;
                }
                value.push(c);
            }
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            if value.eq_ignore_ascii_case("NULL") {
                elements.push(None);
            } else {
                elements.push(Some(value.to_string()));
            }
        }

        match chars.next() {
            None => return Some(elements),
            Some(',') => {}
            Some(_) => return None,
        }
    }
}
