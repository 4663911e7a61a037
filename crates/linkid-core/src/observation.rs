//! The validated input to identity resolution.

use crate::{Error, Result};

/// An incoming (email, phone number) sighting.
///
/// Constructed only through [`Observation::new`], so every value carries at
/// least one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
  email:        Option<String>,
  phone_number: Option<String>,
}

impl Observation {
  /// Validate and build an observation.
  ///
  /// Empty strings count as absent. Values are otherwise kept byte-for-byte;
  /// matching is exact.
  pub fn new(email: Option<String>, phone_number: Option<String>) -> Result<Self> {
    let email = email.filter(|e| !e.is_empty());
    let phone_number = phone_number.filter(|p| !p.is_empty());

    if email.is_none() && phone_number.is_none() {
      return Err(Error::Validation(
        "at least one identifier required".to_owned(),
      ));
    }

    Ok(Self { email, phone_number })
  }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone_number(&self) -> Option<&str> { self.phone_number.as_deref() }
}
