//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! single values at parse time. Checks that involve several flags or the
//! filesystem happen later, in `AnalysisConfig::from_cli`.

/// Validate a package name.
///
/// Surrounding whitespace is trimmed. An empty name passes through so the
/// configuration check can report it alongside any other problems.
///
/// Examples: `Newtonsoft.Json`, `Microsoft.Extensions.Logging`, `A`
pub fn validate_package_name(s: &str) -> Result<String, String> {
    let s = s.trim();

    if let Some(pos) = s.chars().position(char::is_whitespace) {
        return Err(format!(
            "Package name cannot contain whitespace (found at position {pos})"
        ));
    }

    if let Some(pos) = s.chars().position(char::is_control) {
        return Err(format!(
            "Package name contains invalid control character at position {pos}"
        ));
    }

    Ok(s.to_string())
}

/// Validate a name filter substring (`--filter`, `--exclude`).
///
/// A blank substring would match every package, so it is rejected.
pub fn validate_substring(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Filter substring cannot be empty".to_string());
    }

    Ok(s.to_string())
}
