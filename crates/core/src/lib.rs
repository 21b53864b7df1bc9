//! # PDS Core
//!
//! Patient demographics lookup against the NHS Personal Demographics Service (PDS) FHIR API,
//! used to enrich triage requests with identity data.
//!
//! This crate contains:
//! - NHS number validation (re-exported from `pds-types`)
//! - environment policy and configuration ([`config`])
//! - the injected HTTP transport capability ([`transport`])
//! - normalisation of PDS `Patient` resources, including the restricted-record rule
//!   ([`demographics`])
//! - the lookup client in blocking and async forms ([`PdsClient`])
//!
//! Lookups are stateless: no retries, no caching, and no patient data is persisted.
//!
//! **No API concerns**: routing, sessions and UI belong to the calling service.

pub mod client;
pub mod config;
pub mod constants;
pub mod demographics;
mod error;
pub mod sandbox;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::PdsClient;
pub use config::{Environment, PdsConfig};
pub use demographics::{normalise_patient, normalise_patient_on, PatientDemographics};
pub use error::{PdsError, PdsResult, RestrictedPatientError};
pub use sandbox::{
    lookup_sandbox_patient, lookup_sandbox_patient_blocking, sandbox_patient_description,
    SANDBOX_TEST_PATIENTS,
};
pub use transport::{
    AsyncTransport, BlockingTransport, ReqwestTransport, TransportRequest, TransportResponse,
};

pub use pds_types::{validate_nhs_number, NhsNumber, NhsNumberError, NonEmptyText};
