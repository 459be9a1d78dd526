use icu_locale::Locale;

use crate::error::{SvgError, SvgResult};

/// Canonical form of a `systemLanguage` value used for comparisons.
///
/// Trims, converts `_` to `-` and lower-cases, so `pt_BR`, `pt-br` and
/// ` PT-BR ` compare equal.
///
/// # Example
///
/// ```ignore
/// assert_eq!(normalize_language("zh_Hans"), "zh-hans");
/// ```
pub fn normalize_language(code: &str) -> String {
    code.trim().replace('_', "-").to_lowercase()
}

/// Validate a language code, or a comma-separated `systemLanguage` list.
///
/// Every member must parse as a BCP 47 tag.
///
/// # Arguments
///
/// * `code` - The code to validate
///
/// # Returns
///
/// * `Ok(())` - If every member is a valid tag
/// * `Err(SvgError::InvalidLanguage)` - Otherwise
pub fn validate_language(code: &str) -> SvgResult<()> {
    if code.trim().is_empty() {
        return Err(SvgError::InvalidLanguage(code.to_string()));
    }
    for member in code.split(',') {
        let tag = member.trim().replace('_', "-");
        tag.parse::<Locale>()
            .map_err(|e| SvgError::InvalidLanguage(format!("{}: {:?}", code, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language("ar"), "ar");
        assert_eq!(normalize_language(" pt_BR "), "pt-br");
        assert_eq!(normalize_language("zh-Hans"), "zh-hans");
    }

    #[test]
    fn test_validate_language() {
        assert!(validate_language("ar").is_ok());
        assert!(validate_language("en-US").is_ok());
        assert!(validate_language("pt_BR").is_ok());
        assert!(validate_language("en, fr").is_ok());
    }

    #[test]
    fn test_validate_language_rejects_garbage() {
        assert!(validate_language("").is_err());
        assert!(validate_language("invalid@code").is_err());
        assert!(validate_language("en,").is_err());
        assert!(matches!(
            validate_language("12"),
            Err(SvgError::InvalidLanguage(_))
        ));
    }
}
