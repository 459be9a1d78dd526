//! Translation dictionary: normalized default text → language → segments.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize, Serializer};

/// Translated segments per language code
pub type LanguageMap = BTreeMap<String, Vec<String>>;

/// A translation value as found in mapping files.
///
/// Single-segment translations are written as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationValue {
    Text(String),
    Segments(Vec<String>),
}

impl TranslationValue {
    pub fn into_segments(self) -> Vec<String> {
        match self {
            TranslationValue::Text(text) => vec![text],
            TranslationValue::Segments(segments) => segments,
        }
    }
}

/// One dictionary entry in either of the two on-disk shapes.
///
/// ```json
/// { "ar": "..." }
/// { "_texts": ["line 1", "line 2"], "_translations": { "ar": ["...", "..."] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TranslationEntry {
    Segmented {
        #[serde(rename = "_texts")]
        texts: Vec<String>,
        #[serde(rename = "_translations", default)]
        translations: BTreeMap<String, TranslationValue>,
    },
    Flat(BTreeMap<String, TranslationValue>),
}

impl TranslationEntry {
    /// Canonical `language → segments` form. Keys starting with `_` in a
    /// flat entry are bookkeeping and dropped.
    pub fn into_languages(self) -> LanguageMap {
        match self {
            TranslationEntry::Segmented { translations, .. } => translations
                .into_iter()
                .map(|(language, value)| (language, value.into_segments()))
                .collect(),
            TranslationEntry::Flat(map) => map
                .into_iter()
                .filter(|(language, _)| !language.starts_with('_'))
                .map(|(language, value)| (language, value.into_segments()))
                .collect(),
        }
    }
}

/// Mapping from translation key to the known translations of that text.
///
/// Keys and languages iterate in sorted order, so serialized output and
/// injection order are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationDictionary {
    entries: BTreeMap<String, LanguageMap>,
}

impl TranslationDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole entry for `key`.
    pub fn set_entry(&mut self, key: impl Into<String>, languages: LanguageMap) {
        self.entries.insert(key.into(), languages);
    }

    /// Add or replace one language of an entry.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        language: impl Into<String>,
        segments: Vec<String>,
    ) {
        self.entries
            .entry(key.into())
            .or_default()
            .insert(language.into(), segments);
    }

    pub fn get(&self, key: &str) -> Option<&LanguageMap> {
        self.entries.get(key)
    }

    pub fn segments(&self, key: &str, language: &str) -> Option<&[String]> {
        self.get(key)?.get(language).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Union of `other` into `self`, per key and per language.
    /// Languages present in both take the value from `other`.
    pub fn merge(&mut self, other: TranslationDictionary) {
        for (key, languages) in other.entries {
            self.entries.entry(key).or_default().extend(languages);
        }
    }

    /// Every language code used by any entry.
    pub fn languages(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .flat_map(|languages| languages.keys().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LanguageMap)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, LanguageMap)> for TranslationDictionary {
    fn from_iter<I: IntoIterator<Item = (String, LanguageMap)>>(iter: I) -> Self {
        TranslationDictionary {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum SegmentsRef<'a> {
    Text(&'a str),
    Segments(&'a [String]),
}

impl<'a> From<&'a [String]> for SegmentsRef<'a> {
    fn from(segments: &'a [String]) -> Self {
        match segments {
            [single] => SegmentsRef::Text(single),
            _ => SegmentsRef::Segments(segments),
        }
    }
}

impl Serialize for TranslationDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(key, languages)| {
            let languages: BTreeMap<&str, SegmentsRef<'_>> = languages
                .iter()
                .map(|(language, segments)| (language.as_str(), segments.as_slice().into()))
                .collect();
            (key, languages)
        }))
    }
}
