use serde_json::Value;

/// Parse a `--var name=value` pair.
///
/// Values that parse as JSON keep their type (`3`, `true`, `["a","b"]`);
/// anything else is taken as a string.
pub fn parse_var(raw: &str) -> anyhow::Result<(String, Value)> {
    let Some((name, value)) = raw.split_once('=') else {
        anyhow::bail!("invalid --var '{raw}': expected name=value");
    };
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("invalid --var '{raw}': empty name");
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
