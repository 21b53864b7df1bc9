//! FHIR wire/boundary support for PDS patient lookups.
//!
//! This crate provides read-only access to the FHIR R4 `Patient` resource returned by the
//! Personal Demographics Service:
//! - [`PatientDocument`] wraps the raw JSON document
//! - explicit optional-field accessors replace ad-hoc nested lookups
//! - borrowed views ([`HumanName`], [`Address`], [`PractitionerReference`]) expose nested entries
//!
//! This crate does not interpret the data (no age calculation, no access decisions). That is
//! the job of the normaliser in `pds-core`.

pub mod patient;

pub use patient::{
    Address, AddressUse, HumanName, NameUse, PatientDocument, PractitionerReference,
    PATIENT_RESOURCE_TYPE,
};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
