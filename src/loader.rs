use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::dictionary::{TranslationDictionary, TranslationEntry};
use crate::error::{SvgError, SvgResult};
use crate::language::validate_language;
use crate::text::normalize_text;

/// Wrapper object some mapping files put their entries under
const NEW_SECTION: &str = "new";
/// Bookkeeping table stored next to the entries inside [`NEW_SECTION`]
const TSPANS_BY_ID: &str = "default_tspans_by_id";

/// Parse a dictionary from JSON text
///
/// Accepted shape:
/// ```json
/// {
///     "@metadata": { ... },  // Ignored
///     "rear speakers carry same signal,": { "ar": "..." },
///     "two lines": { "_texts": ["two lines", "second"], "_translations": { "fr": ["...", "..."] } }
/// }
/// ```
/// The entries may also sit under a top-level `"new"` object, in which case
/// everything else at the top level is ignored.
///
/// # Arguments
/// * `json` - The JSON text
/// * `origin` - Name used in error and log messages
///
/// Languages with an invalid code, or with no non-blank text, are dropped
/// with a warning.
///
/// # Errors
/// - Invalid JSON
/// - Root is not an object
pub fn parse_dictionary(json: &str, origin: &str) -> SvgResult<TranslationDictionary> {
    let root: Value = serde_json::from_str(json).map_err(|e| SvgError::Json {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;

    let obj = root.as_object().ok_or_else(|| SvgError::Json {
        origin: origin.to_string(),
        reason: "root must be an object".to_string(),
    })?;
    let obj = match obj.get(NEW_SECTION).and_then(Value::as_object) {
        Some(section) => section,
        None => obj,
    };

    let mut dictionary = TranslationDictionary::new();
    for (key, value) in obj {
        if key.starts_with('@') || key == TSPANS_BY_ID {
            continue;
        }

        let key = normalize_text(key);
        if key.is_empty() {
            continue;
        }

        let entry: TranslationEntry = match serde_json::from_value(value.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("{}: entry '{}' has an unsupported shape, skipping: {}", origin, key, e);
                continue;
            }
        };

        let mut languages = entry.into_languages();
        languages.retain(|language, segments| {
            if let Err(e) = validate_language(language) {
                tracing::warn!("{}: dropping '{}' for '{}': {}", origin, language, key, e);
                return false;
            }
            if segments.iter().all(|segment| segment.trim().is_empty()) {
                tracing::warn!("{}: dropping '{}' for '{}': no text", origin, language, key);
                return false;
            }
            true
        });
        if languages.is_empty() {
            continue;
        }

        let mut existing = dictionary.get(&key).cloned().unwrap_or_default();
        existing.extend(languages);
        dictionary.set_entry(key, existing);
    }

    Ok(dictionary)
}

/// Load a dictionary from a single JSON file
///
/// # Errors
/// - File not found
/// - File read errors
/// - Invalid JSON
pub fn load_dictionary_from_file(path: &Path) -> SvgResult<TranslationDictionary> {
    if !path.exists() {
        return Err(SvgError::DocumentNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| SvgError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dictionary(&content, &path.display().to_string())
}

/// Load and merge several mapping files
///
/// Entries are merged per key and per language; later files win on
/// conflicts. Files that are missing or unreadable are logged and skipped.
pub fn load_dictionaries(paths: &[PathBuf]) -> TranslationDictionary {
    let mut merged = TranslationDictionary::new();
    for path in paths {
        match load_dictionary_from_file(path) {
            Ok(dictionary) => {
                tracing::debug!("Loaded {} entries from {}", dictionary.len(), path.display());
                merged.merge(dictionary);
            }
            Err(e) => tracing::warn!("Skipping mapping file: {}", e),
        }
    }
    tracing::info!(
        "Loaded {} translation keys in {} languages",
        merged.len(),
        merged.languages().len()
    );
    merged
}

/// Serialize a dictionary as pretty-printed JSON
pub fn dictionary_to_json(dictionary: &TranslationDictionary) -> SvgResult<String> {
    serde_json::to_string_pretty(dictionary).map_err(|e| SvgError::Json {
        origin: "dictionary".to_string(),
        reason: e.to_string(),
    })
}

/// Write a dictionary to `path` as pretty-printed JSON
pub fn save_dictionary(dictionary: &TranslationDictionary, path: &Path) -> SvgResult<()> {
    let json = dictionary_to_json(dictionary)?;
    fs::write(path, json).map_err(|e| SvgError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_flat_and_segmented() {
        let json = r#"{
            "@metadata": {"authors": ["x"]},
            "hello   world": {"ar": "مرحبا بالعالم"},
            "two lines": {"_texts": ["two lines", "second"], "_translations": {"fr": ["deux lignes", "seconde"]}}
        }"#;
        let dict = parse_dictionary(json, "test").unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(
            dict.segments("hello world", "ar"),
            Some(&segments(&["مرحبا بالعالم"])[..])
        );
        assert_eq!(
            dict.segments("two lines", "fr"),
            Some(&segments(&["deux lignes", "seconde"])[..])
        );
    }

    #[test]
    fn test_parse_new_section() {
        let json = r#"{
            "new": {
                "default_tspans_by_id": {"tspan1": "Hello"},
                "hello": {"ar": "مرحبا"}
            },
            "ignored": {"fr": "ignoré"}
        }"#;
        let dict = parse_dictionary(json, "test").unwrap();
        assert_eq!(dict.len(), 1);
        assert!(dict.contains_key("hello"));
    }

    #[test]
    fn test_invalid_languages_and_shapes_are_dropped() {
        let json = r#"{
            "hello": {"ar": "مرحبا", "not a language": "x"},
            "broken": 42,
            "only bad": {"@@": "x"}
        }"#;
        let dict = parse_dictionary(json, "test").unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("hello").unwrap().len(), 1);
    }

    #[test]
    fn test_languages_without_text_are_dropped() {
        let json = r#"{
            "hello": {"fr": [], "de": "Hallo", "es": ["  ", ""], "it": ""},
            "bye": {"fr": []}
        }"#;
        let dict = parse_dictionary(json, "test").unwrap();
        assert_eq!(dict.len(), 1);
        let languages: Vec<&String> = dict.get("hello").unwrap().keys().collect();
        assert_eq!(languages, vec!["de"]);

        let out = crate::inject_str(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><switch><text id="t">Hello</text></switch></svg>"#,
            &dict,
            &crate::InjectOptions::default(),
        )
        .unwrap();
        assert_eq!(out.stats.inserted_translations, 1);
        assert!(out.to_xml().contains(r#"systemLanguage="de""#));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_dictionary("{not json", "x"),
            Err(SvgError::Json { .. })
        ));
        assert!(matches!(
            parse_dictionary("[1, 2]", "x"),
            Err(SvgError::Json { .. })
        ));
    }

    #[test]
    fn test_load_and_merge_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        fs::write(&first, r#"{"hello": {"ar": "مرحبا", "fr": "salut"}}"#).unwrap();
        fs::write(&second, r#"{"hello": {"fr": "bonjour"}, "bye": {"de": "tschüss"}}"#).unwrap();

        let dict = load_dictionaries(&[first, dir.path().join("missing.json"), second]);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.segments("hello", "fr"), Some(&segments(&["bonjour"])[..]));
        assert_eq!(dict.segments("hello", "ar"), Some(&segments(&["مرحبا"])[..]));
    }

    #[test]
    fn test_missing_file() {
        let err = load_dictionary_from_file(Path::new("/nonexistent/mapping.json")).unwrap_err();
        assert_eq!(err.kind(), "not-found");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut dict = TranslationDictionary::new();
        dict.insert("hello", "ar", segments(&["مرحبا"]));
        dict.insert("two lines", "fr", segments(&["un", "deux"]));

        save_dictionary(&dict, &path).unwrap();
        assert_eq!(load_dictionary_from_file(&path).unwrap(), dict);
    }
}
