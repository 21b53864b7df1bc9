//! Validated primitive types shared across the PDS lookup crates.
//!
//! Nothing in here performs I/O. The NHS number validator is exposed as a plain function so
//! upstream request validators can call it without constructing a lookup client.

mod nhs_number;
mod text;

pub use nhs_number::{validate_nhs_number, NhsNumber, NhsNumberError};
pub use text::{NonEmptyText, TextError};
