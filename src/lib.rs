//! Copy multilingual text between SVG files.
//!
//! SVG files translated for Wikimedia Commons keep every language of a label
//! inside one `<switch>`:
//!
//! ```xml
//! <switch>
//!   <text systemLanguage="ar"><tspan>السماعات الخلفية تنقل الإشارة نفسها،</tspan></text>
//!   <text><tspan>Rear speakers carry same signal,</tspan></text>
//! </switch>
//! ```
//!
//! [`extract`] turns such a file into a [`TranslationDictionary`] keyed by
//! the normalized default text; [`inject`] adds the missing language
//! variants of that dictionary to another file with the same labels.
//!
//! ```ignore
//! let dict = extract_str(translated_svg, &ExtractOptions::default())?;
//! let out = inject_str(untranslated_svg, &dict, &InjectOptions::default())?;
//! assert_eq!(out.stats.inserted_translations, 1);
//! std::fs::write("out.svg", out.to_xml())?;
//! ```

pub mod batch;
pub mod dictionary;
pub mod dom;
pub mod error;
pub mod extract;
pub mod ids;
pub mod inject;
pub mod language;
pub mod loader;
pub mod nested;
pub mod options;
pub mod stats;
pub mod switch;
pub mod text;


pub use batch::{inject_file, inject_files, process_file, write_output};
pub use dictionary::{LanguageMap, TranslationDictionary, TranslationEntry, TranslationValue};
pub use dom::{Document, parse_bytes, parse_str};
pub use error::{SvgError, SvgResult};
pub use extract::{extract, extract_file, extract_str};
pub use ids::IdRegistry;
pub use inject::{InjectOutput, inject, inject_str};
pub use language::{normalize_language, validate_language};
pub use loader::{
    dictionary_to_json, load_dictionaries, load_dictionary_from_file, parse_dictionary,
    save_dictionary,
};
pub use nested::{NestedTspan, find_nested_tspans};
pub use options::{ExtractOptions, InjectOptions};
pub use stats::{BatchReport, FileReport, InjectionStats};
pub use switch::{SVG_NS, SwitchBlock, TextVariant, scan};
pub use text::normalize_text;
