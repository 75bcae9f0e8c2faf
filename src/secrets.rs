//! Secret lookup for the code that wires storage and publishing together.

use crate::error::{ProcessingError, ProcessingResult};

/// Resolves secrets by project and secret id.
pub trait SecretSource: Send + Sync {
    fn get_secret(&self, project_id: &str, secret_id: &str) -> ProcessingResult<String>;
}

/// Reads secrets from environment variables named `<PREFIX>_<PROJECT>_<SECRET>`.
///
/// Names are upper-cased and every character outside `[A-Z0-9]` becomes `_`, so project
/// `my-project` and secret `api.key` under prefix `SECRET` read `SECRET_MY_PROJECT_API_KEY`.
#[derive(Debug, Clone)]
pub struct EnvSecretSource {
    prefix: String,
}

impl Default for EnvSecretSource {
    fn default() -> Self {
        Self::new("SECRET")
    }
}

impl EnvSecretSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn variable_name(&self, project_id: &str, secret_id: &str) -> String {
        [self.prefix.as_str(), project_id, secret_id]
            .iter()
            .map(|part| env_segment(part))
            .collect::<Vec<_>>()
            .join("_")
    }
}

fn env_segment(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

impl SecretSource for EnvSecretSource {
    fn get_secret(&self, project_id: &str, secret_id: &str) -> ProcessingResult<String> {
        let var = self.variable_name(project_id, secret_id);
        std::env::var(&var).map_err(|e| ProcessingError::Secret {
            message: format!("{var}: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_names_are_sanitized() {
        let src = EnvSecretSource::default();
        assert_eq!(src.variable_name("my-project", "api.key"), "SECRET_MY_PROJECT_API_KEY");
    }

    #[test]
    fn missing_secret_is_an_error() {
        let src = EnvSecretSource::new("EVENT_TRANSFORMS_TEST_UNSET");
        let err = src.get_secret("p", "s").unwrap_err();
        assert!(err.to_string().contains("EVENT_TRANSFORMS_TEST_UNSET_P_S"));
    }

    #[test]
    fn present_secret_is_returned() {
        let src = EnvSecretSource::new("EVENT_TRANSFORMS_TEST_SET");
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("EVENT_TRANSFORMS_TEST_SET_PROJ_TOKEN", "s3cr3t") };
        assert_eq!(src.get_secret("proj", "token").unwrap(), "s3cr3t");
    }
}
