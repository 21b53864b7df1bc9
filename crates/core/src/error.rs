use pds_types::{NhsNumber, NhsNumberError};

/// The registry marked the record as restricted.
///
/// Carries the NHS number and nothing else: no field of the record is extracted once the
/// restricted marker is seen. Callers should treat this as access denied and must not fall
/// back to a generic error path that could forward registry content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("access to patient record {nhs_number} is RESTRICTED")]
pub struct RestrictedPatientError {
    nhs_number: NhsNumber,
}

impl RestrictedPatientError {
    pub(crate) fn new(nhs_number: NhsNumber) -> Self {
        Self { nhs_number }
    }

    pub fn nhs_number(&self) -> &NhsNumber {
        &self.nhs_number
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdsError {
    #[error("invalid NHS number {input:?}: {reason}")]
    InvalidNhsNumber {
        input: String,
        #[source]
        reason: NhsNumberError,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("PDS request failed with HTTP status {status}")]
    Transport { status: u16, body: String },
    #[error("PDS request did not complete: {0}")]
    Connection(String),
    #[error("failed to parse PDS response: {0}")]
    ResponseParsing(String),
    #[error(transparent)]
    Restricted(#[from] RestrictedPatientError),
}

impl PdsError {
    /// Returns `true` for [`PdsError::Restricted`].
    pub fn is_restricted(&self) -> bool {
        matches!(self, PdsError::Restricted(_))
    }
}

impl From<fhir::FhirError> for PdsError {
    fn from(err: fhir::FhirError) -> Self {
        PdsError::ResponseParsing(err.to_string())
    }
}

pub type PdsResult<T> = std::result::Result<T, PdsError>;
