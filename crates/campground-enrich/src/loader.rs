use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::types::{CampgroundRecord, EnrichError};

/// Load campground records from a JSON file holding a top-level array of objects
pub fn load_campgrounds(path: &Path) -> Result<Vec<CampgroundRecord>, EnrichError> {
    if !path.exists() {
        return Err(EnrichError::InputMissing(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let records = parse_campgrounds(&contents, path)?;

    info!("Loaded {} campgrounds from {}", records.len(), path.display());
    Ok(records)
}

/// Parse the contents of a campground file. `source` is only used in error messages.
pub fn parse_campgrounds(contents: &str, source: &Path) -> Result<Vec<CampgroundRecord>, EnrichError> {
    let data: Value = serde_json::from_str(contents)?;

    let Value::Array(items) = data else {
        return Err(EnrichError::NotAnArray(source.to_path_buf()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(CampgroundRecord::from(fields)),
            _ => Err(EnrichError::InvalidRecord { index }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_campgrounds_reads_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all_campground.json");
        fs::write(
            &path,
            r#"[{"id": "{X1}", "title": "Bald Rock"}, {"title": "No id"}]"#,
        )
        .unwrap();

        let records = load_campgrounds(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raw_id(), Some("{X1}"));
        assert_eq!(records[1].title(), Some("No id"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        let err = load_campgrounds(&path).unwrap_err();
        assert!(matches!(err, EnrichError::InputMissing(_)));
        assert!(err.to_string().starts_with("Missing file: "));
    }

    #[test]
    fn test_top_level_must_be_array() {
        let err = parse_campgrounds(r#"{"id": "X1"}"#, Path::new("all_campground.json"))
            .unwrap_err();
        assert!(matches!(err, EnrichError::NotAnArray(_)));
        assert_eq!(
            err.to_string(),
            "all_campground.json: expected a list of objects"
        );
    }

    #[test]
    fn test_elements_must_be_objects() {
        let err = parse_campgrounds(r#"[{"id": "X1"}, 3]"#, Path::new("in.json")).unwrap_err();
        assert!(matches!(err, EnrichError::InvalidRecord { index: 1 }));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_campgrounds("[{", Path::new("in.json")).unwrap_err();
        assert!(matches!(err, EnrichError::Json(_)));
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_campgrounds("[]", Path::new("in.json")).unwrap().is_empty());
    }
}
