use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let (canonical, contents) = read_file(path)?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read a TOML file and deserialise into a typed struct.
pub fn read_toml<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let (canonical, contents) = read_file(path)?;
    let value: T = toml::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

fn read_file(path: &str) -> Result<(PathBuf, String), Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    tracing::debug!(path = %canonical.display(), "reading input file");
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    Ok((canonical, contents))
}

/// Resolve a relative path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, serde::Deserialize)]
    struct Sample {
        amount: String,
    }

    #[test]
    fn test_read_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"amount": "12.50"}}"#).unwrap();
        let sample: Sample = read_json(file.path().to_str().unwrap()).unwrap();
        assert_eq!(sample.amount, "12.50");
    }

    #[test]
    fn test_missing_file_reported() {
        let err = read_json::<Sample>("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_toml::<Sample>(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Not a file"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_json::<Sample>(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
