//! Lookup client configuration.
//!
//! Configuration is resolved once at process startup and handed to [`crate::PdsClient`]. The
//! environment policy is enforced here: integration and production require a bearer token, and
//! a missing token fails construction before any request can be made. Nothing in this module
//! reads process environment variables; binaries read them and pass the raw values in.

use crate::constants::{
    DEFAULT_TIMEOUT_SECS, INTEGRATION_BASE_URL, PATIENT_RESOURCE_PATH, PRODUCTION_BASE_URL,
    SANDBOX_BASE_URL,
};
use crate::{PdsError, PdsResult};
use pds_types::{NhsNumber, NonEmptyText};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// PDS deployment tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Public sandbox with canned test patients. No authentication.
    #[default]
    Sandbox,
    /// Path-to-live integration environment.
    Integration,
    /// Live service.
    Production,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Integration => INTEGRATION_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }

    pub fn requires_access_token(self) -> bool {
        !matches!(self, Environment::Sandbox)
    }

    /// Short name as used by the NHS API platform (`sandbox`, `int`, `prod`).
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Integration => "int",
            Environment::Production => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = PdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "int" | "integration" => Ok(Environment::Integration),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(PdsError::Configuration(format!(
                "unknown PDS environment '{other}' (expected sandbox, int or prod)"
            ))),
        }
    }
}

/// Validated configuration for a [`crate::PdsClient`].
#[derive(Clone, Debug)]
pub struct PdsConfig {
    environment: Environment,
    access_token: Option<NonEmptyText>,
    timeout: Duration,
}

impl PdsConfig {
    /// Create a new `PdsConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`PdsError::Configuration`] if `environment` requires a bearer token and none was
    /// supplied, or if `timeout` is zero.
    pub fn new(
        environment: Environment,
        access_token: Option<NonEmptyText>,
        timeout: Duration,
    ) -> PdsResult<Self> {
        if environment.requires_access_token() && access_token.is_none() {
            return Err(PdsError::Configuration(format!(
                "access token required for {environment} environment; use sandbox for unauthenticated testing"
            )));
        }

        if timeout.is_zero() {
            return Err(PdsError::Configuration(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            environment,
            access_token,
            timeout,
        })
    }

    /// Unauthenticated sandbox configuration with the default timeout.
    pub fn sandbox() -> Self {
        Self {
            environment: Environment::Sandbox,
            access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a configuration from optional raw values, as read once at startup.
    ///
    /// Blank values count as absent. Defaults: sandbox environment, 30 second timeout.
    pub fn from_env_values(
        environment: Option<String>,
        access_token: Option<String>,
        timeout_secs: Option<String>,
    ) -> PdsResult<Self> {
        let environment = non_blank(environment)
            .map(|v| v.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();

        let timeout_secs = non_blank(timeout_secs)
            .map(|v| {
                v.parse::<u64>().map_err(|_| {
                    PdsError::Configuration(format!("invalid timeout seconds '{v}'"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(
            environment,
            NonEmptyText::from_optional(access_token),
            Duration::from_secs(timeout_secs),
        )
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn access_token(&self) -> Option<&NonEmptyText> {
        self.access_token.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn base_url(&self) -> &'static str {
        self.environment.base_url()
    }

    /// Full resource URL for one patient read.
    pub fn patient_url(&self, nhs_number: &NhsNumber) -> String {
        format!("{}{}/{}", self.base_url(), PATIENT_RESOURCE_PATH, nhs_number)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Option<NonEmptyText> {
        Some(NonEmptyText::new("test-token").unwrap())
    }

    #[test]
    fn sandbox_needs_no_token() {
        let cfg = PdsConfig::new(Environment::Sandbox, None, Duration::from_secs(5))
            .expect("sandbox is unauthenticated");
        assert_eq!(cfg.environment(), Environment::Sandbox);
        assert!(cfg.access_token().is_none());
        assert_eq!(cfg.base_url(), "https://sandbox.api.service.nhs.uk");
    }

    #[test]
    fn integration_requires_token() {
        let err = PdsConfig::new(Environment::Integration, None, Duration::from_secs(5))
            .expect_err("token is mandatory");
        match err {
            PdsError::Configuration(msg) => assert!(msg.contains("access token required")),
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn production_requires_token() {
        assert!(matches!(
            PdsConfig::new(Environment::Production, None, Duration::from_secs(5)),
            Err(PdsError::Configuration(_))
        ));
    }

    #[test]
    fn integration_with_token() {
        let cfg = PdsConfig::new(Environment::Integration, token(), Duration::from_secs(5))
            .expect("token supplied");
        assert_eq!(cfg.access_token().map(|t| t.as_str()), Some("test-token"));
        assert_eq!(cfg.base_url(), "https://int.api.service.nhs.uk");
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(matches!(
            PdsConfig::new(Environment::Sandbox, None, Duration::ZERO),
            Err(PdsError::Configuration(_))
        ));
    }

    #[test]
    fn patient_url_joins_base_path_and_number() {
        let cfg = PdsConfig::new(Environment::Production, token(), Duration::from_secs(5)).unwrap();
        let nhs = NhsNumber::parse("9000000009").unwrap();
        assert_eq!(
            cfg.patient_url(&nhs),
            "https://api.service.nhs.uk/personal-demographics/FHIR/R4/Patient/9000000009"
        );
    }

    #[test]
    fn environment_parses_aliases() {
        assert_eq!("SANDBOX".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert_eq!("int".parse::<Environment>().unwrap(), Environment::Integration);
        assert_eq!(
            " integration ".parse::<Environment>().unwrap(),
            Environment::Integration
        );
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(
            "Production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn from_env_values_defaults_to_sandbox() {
        let cfg = PdsConfig::from_env_values(None, None, None).expect("defaults are valid");
        assert_eq!(cfg.environment(), Environment::Sandbox);
        assert_eq!(cfg.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn from_env_values_blank_token_counts_as_missing() {
        let err = PdsConfig::from_env_values(Some("prod".into()), Some("   ".into()), None)
            .expect_err("blank token is not a token");
        assert!(matches!(err, PdsError::Configuration(_)));
    }

    #[test]
    fn from_env_values_parses_all_fields() {
        let cfg = PdsConfig::from_env_values(
            Some("int".into()),
            Some("abc".into()),
            Some("12".into()),
        )
        .unwrap();
        assert_eq!(cfg.environment(), Environment::Integration);
        assert_eq!(cfg.timeout(), Duration::from_secs(12));
    }

    #[test]
    fn from_env_values_rejects_bad_timeout() {
        assert!(matches!(
            PdsConfig::from_env_values(None, None, Some("soon".into())),
            Err(PdsError::Configuration(_))
        ));
    }
}
