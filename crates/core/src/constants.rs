//! Constants used throughout the PDS core crate.
//!
//! Endpoints, paths and header values for the Personal Demographics Service FHIR API.

/// Sandbox host; no authentication.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.api.service.nhs.uk";

/// Integration test host; bearer token required.
pub const INTEGRATION_BASE_URL: &str = "https://int.api.service.nhs.uk";

/// Production host; bearer token required.
pub const PRODUCTION_BASE_URL: &str = "https://api.service.nhs.uk";

/// Resource path appended to every base URL. The NHS number follows after a `/`.
pub const PATIENT_RESOURCE_PATH: &str = "/personal-demographics/FHIR/R4/Patient";

/// Media type requested from PDS.
pub const FHIR_JSON_MEDIA_TYPE: &str = "application/fhir+json";

pub const ACCEPT_HEADER: &str = "Accept";
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Security label code PDS uses for restricted (sensitive) records.
pub const RESTRICTED_SECURITY_CODE: &str = "R";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
