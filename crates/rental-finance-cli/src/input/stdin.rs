use serde_json::Value;
use std::io::{self, Read};

/// Read a JSON document piped on stdin.
/// Returns None when stdin is a TTY or carries nothing but whitespace.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse JSON from stdin: {e}"))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_none() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_json_input_parsed() {
        let value = parse_piped(r#"{"units": []}"#).unwrap().unwrap();
        assert!(value["units"].is_array());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_piped("{units").is_err());
    }
}
