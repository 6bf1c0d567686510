//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config value.
///
/// Bare `$VAR` is left alone, so values without `${` are returned as is.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.0),
    })
}

/// Name of a variable that was referenced but not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var_inside_path() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DOCKET_EXPAND_ROOT", "/srv/docs");
        }
        let result = expand_env("${DOCKET_EXPAND_ROOT}/Documentation", "docs.root").unwrap();
        assert_eq!(result, "/srv/docs/Documentation");
        unsafe {
            std::env::remove_var("DOCKET_EXPAND_ROOT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DOCKET_EXPAND_UNSET");
        }
        let result = expand_env("${DOCKET_EXPAND_UNSET:-Documentation}", "docs.root").unwrap();
        assert_eq!(result, "Documentation");
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DOCKET_EXPAND_MISSING");
        }
        let err = expand_env("${DOCKET_EXPAND_MISSING}", "repository.root").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("DOCKET_EXPAND_MISSING"));
        assert!(err.to_string().contains("repository.root"));
    }

    #[test]
    fn test_template_placeholders_untouched() {
        let result = expand_env("/attachments/{version}/{key}/{file}", "images.url_template")
            .unwrap();
        assert_eq!(result, "/attachments/{version}/{key}/{file}");
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("/price/$file", "images.url_template").unwrap();
        assert_eq!(result, "/price/$file");
    }
}
