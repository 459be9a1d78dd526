use serde::{Deserialize, Serialize};

/// Options for building a dictionary from a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Lower-case translation keys
    pub case_insensitive: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            case_insensitive: true,
        }
    }
}

/// Options for applying a dictionary to a target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectOptions {
    /// Replace the text of language variants that already exist
    pub overwrite: bool,
    /// Lower-case keys before lookup; must match the flag used at extraction
    pub case_insensitive: bool,
    /// Move the default `<text>` to the end of every switch
    pub sort_switch_texts: bool,
}

impl Default for InjectOptions {
    fn default() -> Self {
        InjectOptions {
            overwrite: false,
            case_insensitive: true,
            sort_switch_texts: true,
        }
    }
}

impl InjectOptions {
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn with_sort_switch_texts(mut self, sort_switch_texts: bool) -> Self {
        self.sort_switch_texts = sort_switch_texts;
        self
    }
}
