//! [`Outcome`] — the uniform result of every gateway operation.

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::Failure;

/// Success with a payload, explicit absence, or a failure with detail.
///
/// Serialises as `{"success": bool, "data": ..}` on success and absence, and
/// as `{"success": false, "error": {"kind": .., "message": ..}}` on failure.
#[derive(Debug)]
pub enum Outcome<T> {
  Success(T),
  /// No record matched. Not an error: carries neither payload nor failure.
  NotFound,
  Failure(Failure),
}

impl<T> Outcome<T> {
  /// The boolean outcome flag.
  pub fn is_success(&self) -> bool { matches!(self, Self::Success(_)) }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound) }

  pub fn payload(&self) -> Option<&T> {
    match self {
      Self::Success(p) => Some(p),
      _ => None,
    }
  }

  pub fn failure(&self) -> Option<&Failure> {
    match self {
      Self::Failure(f) => Some(f),
      _ => None,
    }
  }

  pub fn into_payload(self) -> Option<T> {
    match self {
      Self::Success(p) => Some(p),
      _ => None,
    }
  }

  /// `Ok(None)` for [`Outcome::NotFound`].
  pub fn into_result(self) -> Result<Option<T>, Failure> {
    match self {
      Self::Success(p) => Ok(Some(p)),
      Self::NotFound => Ok(None),
      Self::Failure(f) => Err(f),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
    match self {
      Self::Success(p) => Outcome::Success(f(p)),
      Self::NotFound => Outcome::NotFound,
      Self::Failure(e) => Outcome::Failure(e),
    }
  }
}

impl<T> From<Failure> for Outcome<T> {
  fn from(failure: Failure) -> Self { Self::Failure(failure) }
}

impl<T: Serialize> Serialize for Outcome<T> {
  fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
    let mut map = serializer.serialize_map(Some(2))?;
    match self {
      Self::Success(payload) => {
        map.serialize_entry("success", &true)?;
        map.serialize_entry("data", payload)?;
      }
      Self::NotFound => {
        map.serialize_entry("success", &false)?;
        map.serialize_entry("data", &())?;
      }
      Self::Failure(failure) => {
        map.serialize_entry("success", &false)?;
        map.serialize_entry("error", &FailureDetail::from(failure))?;
      }
    }
    map.end()
  }
}

/// Wire form of a [`Failure`].
#[derive(Debug, Serialize)]
pub struct FailureDetail {
  pub kind:    &'static str,
  pub message: String,
}

impl From<&Failure> for FailureDetail {
  fn from(failure: &Failure) -> Self {
    Self { kind: failure.kind(), message: failure.to_string() }
  }
}
