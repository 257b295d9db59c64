use serde_json::Value;
use std::io::{self, Read};

/// Read a piped session document from stdin. JSON is expected; YAML is
/// accepted when the text is not JSON. Returns None if stdin is a TTY.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => {
            let value: Value = serde_yaml::from_str(trimmed)
                .map_err(|_| format!("Failed to parse stdin as JSON: {json_err}"))?;
            Ok(Some(value))
        }
    }
}
