use std::fs;
use std::path::Path;

use crate::dictionary::{LanguageMap, TranslationDictionary};
use crate::dom::{Document, parse_bytes, parse_str};
use crate::error::{SvgError, SvgResult};
use crate::options::ExtractOptions;
use crate::switch::scan;
use crate::text::{fold_text, normalize_text};

/// Build a dictionary from every switch of `doc`.
///
/// A switch contributes an entry when its default text has a non-empty
/// first segment and at least one language variant has text. Variant
/// segments are whitespace-normalized but never case-folded. When two
/// switches share a key, the later one replaces the earlier entry.
pub fn extract(doc: &Document, options: &ExtractOptions) -> TranslationDictionary {
    let mut dictionary = TranslationDictionary::new();
    let mut processed = 0;

    for block in scan(doc) {
        let Some(default) = &block.default else {
            continue;
        };
        let key = match default.segments.first() {
            Some(first) => fold_text(first, options.case_insensitive),
            None => continue,
        };
        if key.is_empty() {
            continue;
        }

        let mut languages = LanguageMap::new();
        for variant in &block.variants {
            let Some(language) = &variant.language else {
                continue;
            };
            let segments: Vec<String> = variant.segments.iter().map(|s| normalize_text(s)).collect();
            if segments.iter().all(String::is_empty) {
                continue;
            }
            languages.insert(language.clone(), segments);
        }
        if languages.is_empty() {
            continue;
        }

        if dictionary.contains_key(&key) {
            tracing::debug!("Duplicate key '{}', later switch wins", key);
        }
        dictionary.set_entry(key, languages);
        processed += 1;
    }

    tracing::info!(
        "Extracted translations for {} switches ({} keys, {} languages)",
        processed,
        dictionary.len(),
        dictionary.languages().len()
    );
    dictionary
}

/// [`extract`] from SVG source text.
pub fn extract_str(source: &str, options: &ExtractOptions) -> SvgResult<TranslationDictionary> {
    let doc = parse_str(source)?;
    Ok(extract(&doc, options))
}

/// [`extract`] from an SVG file on disk.
pub fn extract_file(path: &Path, options: &ExtractOptions) -> SvgResult<TranslationDictionary> {
    if !path.exists() {
        return Err(SvgError::DocumentNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| SvgError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Extracting translations from {}", path.display());
    let doc = parse_bytes(&bytes)?;
    Ok(extract(&doc, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    const MULTI: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <switch>
    <text systemLanguage="fr"><tspan> Deux   lignes </tspan><tspan>Seconde</tspan></text>
    <text systemLanguage="de"><tspan/><tspan/></text>
    <text><tspan>Two  Lines</tspan><tspan>Second</tspan></text>
  </switch>
  <switch>
    <text>No translations here</text>
  </switch>
  <switch>
    <text systemLanguage="fr">vide</text>
    <text>   </text>
  </switch>
</svg>"#;

    #[test]
    fn test_extract_segments() {
        let dict = extract_str(MULTI, &ExtractOptions::default()).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(
            dict.segments("two lines", "fr"),
            Some(&strings(&["Deux lignes", "Seconde"])[..])
        );
        assert!(dict.segments("two lines", "de").is_none());
    }

    #[test]
    fn test_case_sensitive_keys() {
        let options = ExtractOptions {
            case_insensitive: false,
        };
        let dict = extract_str(MULTI, &options).unwrap();
        assert!(dict.contains_key("Two Lines"));
        assert!(!dict.contains_key("two lines"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let source = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <switch><text systemLanguage="fr">Premier</text><text>Hello</text></switch>
  <switch><text systemLanguage="ar">مرحبا</text><text>hello</text></switch>
</svg>"#;
        let dict = extract_str(source, &ExtractOptions::default()).unwrap();
        let entry = dict.get("hello").unwrap();
        assert_eq!(entry.len(), 1);
        assert_eq!(entry["ar"], strings(&["مرحبا"]));
    }

    #[test]
    fn test_extract_file_errors() {
        let err = extract_file(Path::new("/nonexistent/file.svg"), &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, SvgError::DocumentNotFound(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.svg");
        fs::write(&path, "<svg><switch></svg>").unwrap();
        let err = extract_file(&path, &ExtractOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "parse-error");
    }
}
