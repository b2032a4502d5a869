// Diagnostic application identifier
//
// Attached to every outgoing request for telemetry attribution. Never used for
// access control.

use super::error::{DomainError, Result};
use std::fmt;
use std::sync::Arc;

/// Maximum length (in characters) of an application identifier
pub const MAX_APP_ID_LEN: usize = 24;

/// Environment variable holding the environment-level application identifier
pub const APP_ID_ENV_VAR: &str = "QUASAR_APP_ID";

/// Validate an individually assigned application identifier.
///
/// Only the caller-supplied identifier goes through this check. The composed
/// identifier is truncated instead.
pub fn validate_app_id(app_id: &str) -> Result<()> {
    let len = app_id.chars().count();
    if len > MAX_APP_ID_LEN {
        return Err(DomainError::AppIdTooLong {
            value: app_id.to_string(),
            len,
            max: MAX_APP_ID_LEN,
        });
    }
    Ok(())
}

/// Immutable, bounded-length identifier computed once per client
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct DiagnosticIdentifier(Arc<str>);

impl DiagnosticIdentifier {
    /// Merge the option-supplied and environment-supplied identifiers.
    ///
    /// Empty strings are treated like absent values. When both are present the
    /// result is `option-env`. Either way the result is cut to the first
    /// [`MAX_APP_ID_LEN`] characters, so an unvalidated environment id stays
    /// bounded too.
    pub fn compose(option_app_id: Option<&str>, env_app_id: Option<&str>) -> Self {
        let option_app_id = option_app_id.filter(|s| !s.is_empty());
        let env_app_id = env_app_id.filter(|s| !s.is_empty());

        let joined = match (option_app_id, env_app_id) {
            (None, None) => String::new(),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (Some(option), Some(env)) => format!("{}-{}", option, env),
        };

        Self(Arc::from(truncate_chars(&joined, MAX_APP_ID_LEN)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

impl fmt::Display for DiagnosticIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DiagnosticIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiagnosticIdentifier({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_empty_yields_empty() {
        assert!(DiagnosticIdentifier::compose(None, None).is_empty());
        assert!(DiagnosticIdentifier::compose(Some(""), Some("")).is_empty());
    }

    #[test]
    fn test_single_identifier_is_verbatim() {
        let option_only = DiagnosticIdentifier::compose(Some("OptionAppId"), None);
        assert_eq!(option_only.as_str(), "OptionAppId");

        let env_only = DiagnosticIdentifier::compose(Some(""), Some("EnvVarAppId"));
        assert_eq!(env_only.as_str(), "EnvVarAppId");
    }

    #[test]
    fn test_both_identifiers_joined_without_truncation() {
        let id = DiagnosticIdentifier::compose(Some("OptionAppId"), Some("EnvVarAppId"));
        assert_eq!(id.as_str(), "OptionAppId-EnvVarAppId");
        assert_eq!(id.as_str().len(), 23);
    }

    #[test]
    fn test_exactly_at_limit_is_kept() {
        // 11 + 1 + 12 = 24
        let id = DiagnosticIdentifier::compose(Some("OptionAppId"), Some("EnvVarAppId2"));
        assert_eq!(id.as_str(), "OptionAppId-EnvVarAppId2");
    }

    #[test]
    fn test_long_composition_is_prefix_truncated() {
        let option = "A".repeat(20);
        let env = "B".repeat(20);
        let id = DiagnosticIdentifier::compose(Some(&option), Some(&env));

        let expected: String = format!("{}-{}", option, env).chars().take(24).collect();
        assert_eq!(id.as_str(), expected);
        assert_eq!(id.as_str().chars().count(), MAX_APP_ID_LEN);
        assert!(id.as_str().ends_with("-BBB"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let id = DiagnosticIdentifier::compose(Some("ééééééééééé"), Some("ääääääääääääää"));
        assert_eq!(id.as_str().chars().count(), MAX_APP_ID_LEN);
    }

    #[test]
    fn test_long_env_only_identifier_is_truncated() {
        let id = DiagnosticIdentifier::compose(None, Some("EnvironmentSuppliedAppIdentifier"));
        assert_eq!(id.as_str(), "EnvironmentSuppliedAppId");
        assert_eq!(id.as_str().chars().count(), MAX_APP_ID_LEN);
    }

    #[test]
    fn test_validate_rejects_long_identifier() {
        let err = validate_app_id("VeryVeryVeryVeryVeryVeryLongOptionAppId").unwrap_err();
        assert!(matches!(err, DomainError::AppIdTooLong { len: 39, max: 24, .. }));
    }

    #[test]
    fn test_validate_accepts_limit_and_empty() {
        assert!(validate_app_id(&"x".repeat(24)).is_ok());
        assert!(validate_app_id("").is_ok());
        assert!(validate_app_id(&"x".repeat(25)).is_err());
    }
}
