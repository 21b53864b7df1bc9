//! Normalisation of PDS `Patient` resources into [`PatientDemographics`].
//!
//! The restricted-record check runs before anything else is read from the document. If the
//! registry has labelled the record restricted, normalisation stops with
//! [`RestrictedPatientError`] and no other field is extracted, so a restricted
//! `PatientDemographics` is never constructed.
//!
//! All other fields are best-effort: a missing or malformed optional field becomes `None`
//! without failing the lookup.

use crate::constants::RESTRICTED_SECURITY_CODE;
use crate::{PdsResult, RestrictedPatientError};
use chrono::{Datelike, Local, NaiveDate};
use fhir::PatientDocument;
use pds_types::NhsNumber;
use serde::Serialize;

/// Normalised demographics for one unrestricted patient.
///
/// Only [`normalise_patient`] builds this type, and only for records without the restricted
/// security label. `is_restricted` is therefore always `false`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientDemographics {
    nhs_number: NhsNumber,
    given_name: Option<String>,
    family_name: Option<String>,
    full_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
    age: Option<u32>,
    gender: Option<String>,
    address: Option<String>,
    postcode: Option<String>,
    gp_practice_ods: Option<String>,
    gp_practice_name: Option<String>,
    is_deceased: bool,
    is_restricted: bool,
}

impl PatientDemographics {
    pub fn nhs_number(&self) -> &NhsNumber {
        &self.nhs_number
    }

    /// Given names joined with spaces.
    pub fn given_name(&self) -> Option<&str> {
        self.given_name.as_deref()
    }

    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn age(&self) -> Option<u32> {
        self.age
    }

    /// Gender with an initial capital, e.g. `Female`.
    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    /// Single-line address: street lines, city, postcode.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn postcode(&self) -> Option<&str> {
        self.postcode.as_deref()
    }

    /// ODS code of the registered GP practice.
    pub fn gp_practice_ods(&self) -> Option<&str> {
        self.gp_practice_ods.as_deref()
    }

    pub fn gp_practice_name(&self) -> Option<&str> {
        self.gp_practice_name.as_deref()
    }

    pub fn is_deceased(&self) -> bool {
        self.is_deceased
    }

    pub fn is_restricted(&self) -> bool {
        self.is_restricted
    }

    /// Short line of clinical context for a triage prompt.
    ///
    /// Includes age, gender, GP practice and a deceased marker. Never includes the address.
    pub fn context_summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(age) = self.age {
            parts.push(format!("Age {age}"));
        }
        if let Some(gender) = &self.gender {
            parts.push(gender.clone());
        }
        match (&self.gp_practice_name, &self.gp_practice_ods) {
            (Some(name), Some(ods)) => parts.push(format!("registered with {name} ({ods})")),
            (Some(name), None) => parts.push(format!("registered with {name}")),
            (None, Some(ods)) => parts.push(format!("registered with practice {ods}")),
            (None, None) => {}
        }
        if self.is_deceased {
            parts.push("DECEASED".to_string());
        }

        if parts.is_empty() {
            "No demographic context available".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Normalise `document` using today's local date for the age calculation.
///
/// # Errors
///
/// Returns [`crate::PdsError::Restricted`] if any `meta.security` label has code `R`.
pub fn normalise_patient(
    nhs_number: &NhsNumber,
    document: &PatientDocument,
) -> PdsResult<PatientDemographics> {
    normalise_patient_on(nhs_number, document, Local::now().date_naive())
}

/// Normalise `document`, computing age as of `today`.
///
/// # Errors
///
/// Same as [`normalise_patient`].
pub fn normalise_patient_on(
    nhs_number: &NhsNumber,
    document: &PatientDocument,
    today: NaiveDate,
) -> PdsResult<PatientDemographics> {
    // Must stay first: nothing else may be read from a restricted record.
    if document.has_security_code(RESTRICTED_SECURITY_CODE) {
        return Err(RestrictedPatientError::new(nhs_number.clone()).into());
    }

    let (given_name, family_name, full_name) = match document.preferred_name() {
        Some(name) => {
            let given = name.given.join(" ");
            let family = name.family.unwrap_or_default();
            let full = format!("{given} {family}");
            (non_empty(&given), non_empty(family), non_empty(&full))
        }
        None => (None, None, None),
    };

    let date_of_birth = document.birth_date().and_then(parse_birth_date);
    let age = date_of_birth.and_then(|dob| age_on(dob, today));

    let gender = document.gender().and_then(capitalise);

    let (address, postcode) = match document.preferred_address() {
        Some(addr) => {
            let segments: Vec<&str> = addr
                .lines
                .iter()
                .copied()
                .chain(addr.city)
                .chain(addr.postal_code)
                .filter(|segment| !segment.trim().is_empty())
                .collect();
            let address = (!segments.is_empty()).then(|| segments.join(", "));
            (address, addr.postal_code.and_then(non_empty))
        }
        None => (None, None),
    };

    let (gp_practice_ods, gp_practice_name) = match document.general_practitioners().next() {
        Some(gp) => (
            gp.identifier_value.and_then(non_empty),
            gp.display.and_then(non_empty),
        ),
        None => (None, None),
    };

    let is_deceased =
        document.deceased_boolean() == Some(true) || document.has_deceased_date_time();

    Ok(PatientDemographics {
        nhs_number: nhs_number.clone(),
        given_name,
        family_name,
        full_name,
        date_of_birth,
        age,
        gender,
        address,
        postcode,
        gp_practice_ods,
        gp_practice_name,
        is_deceased,
        is_restricted: false,
    })
}

/// Whole years between `birth_date` and `today`.
///
/// `None` if the birth date is after `today`.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

/// Parses a full `YYYY-MM-DD` date; partial FHIR dates (`1990`, `1990-05`) are not usable.
fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn capitalise(raw: &str) -> Option<String> {
    let mut chars = raw.trim().chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
