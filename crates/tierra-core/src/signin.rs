//! Hand-off from the external identity provider to the home view.
//!
//! After the popup sign-in completes, the provider's profile is written to
//! the `users` collection and the visitor is sent home. Whether a failed
//! write blocks that navigation is an explicit [`ProfileSync`] policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  Failure,
  gateway::UserGateway,
  store::DocumentStore,
  user::{UserId, UserRecord},
};

/// The user object returned by the identity provider on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
  pub email:        String,
  #[serde(default)]
  pub display_name: Option<String>,
  #[serde(default, rename = "photoURL")]
  pub photo_url:    Option<String>,
}

impl From<IdentityProfile> for UserRecord {
  fn from(profile: IdentityProfile) -> Self {
    Self {
      email: profile.email,
      name:  profile.display_name.unwrap_or_default(),
      photo: profile.photo_url.unwrap_or_default(),
    }
  }
}

/// What to do when the profile write fails after a successful sign-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSync {
  /// Log the failure and navigate anyway.
  #[default]
  BestEffort,
  /// Abort the hand-off and surface the failure.
  Required,
}

/// Views a completed sign-in can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
  Home,
}

impl Route {
  pub fn path(self) -> &'static str {
    match self {
      Self::Home => "/home",
    }
  }
}

/// Where the visitor goes next, and the profile record if one was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Landing {
  pub route:   Route,
  pub user_id: Option<UserId>,
}

#[derive(Debug, Error)]
pub enum SignInError {
  #[error("profile sync failed: {0}")]
  ProfileSync(#[source] Failure),
}

pub struct SignIn<S> {
  gateway: UserGateway<S>,
  policy:  ProfileSync,
}

impl<S: DocumentStore> SignIn<S> {
  pub fn new(gateway: UserGateway<S>, policy: ProfileSync) -> Self {
    Self { gateway, policy }
  }

  /// Record the signed-in profile and pick the landing view.
  ///
  /// Creation is attempted on every sign-in; existing records with the same
  /// e-mail are not looked up.
  pub async fn complete(&self, profile: IdentityProfile) -> Result<Landing, SignInError> {
    let user_id = match self.gateway.create(profile.into()).await.into_result() {
      Ok(id) => id,
      Err(failure) => match self.policy {
        ProfileSync::Required => return Err(SignInError::ProfileSync(failure)),
        ProfileSync::BestEffort => {
          tracing::warn!(error = %failure, "profile sync failed; continuing sign-in");
          None
        }
      },
    };

    Ok(Landing { route: Route::Home, user_id })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use serde_json::json;

  use super::*;
  use crate::memory::MemoryStore;

  fn profile() -> IdentityProfile {
    serde_json::from_value(json!({
      "email":       "a@x.com",
      "displayName": "A",
      "photoURL":    "http://x/a.png",
    }))
    .unwrap()
  }

  fn sign_in(policy: ProfileSync) -> (MemoryStore, SignIn<MemoryStore>) {
    let store = MemoryStore::new();
    let gateway = UserGateway::new(Arc::new(store.clone()));
    (store, SignIn::new(gateway, policy))
  }

  #[test]
  fn profile_fields_are_renamed() {
    let record = UserRecord::from(profile());
    assert_eq!(record, UserRecord::new("a@x.com", "A", "http://x/a.png"));
  }

  #[test]
  fn missing_display_name_and_photo_become_empty() {
    let p: IdentityProfile =
      serde_json::from_value(json!({ "email": "a@x.com" })).unwrap();
    assert_eq!(UserRecord::from(p), UserRecord::new("a@x.com", "", ""));
  }

  #[test]
  fn default_policy_is_best_effort() {
    assert_eq!(ProfileSync::default(), ProfileSync::BestEffort);
    let p: ProfileSync = serde_json::from_value(json!("required")).unwrap();
    assert_eq!(p, ProfileSync::Required);
  }

  #[tokio::test]
  async fn successful_sign_in_lands_home_with_record() {
    let (_, s) = sign_in(ProfileSync::BestEffort);
    let landing = s.complete(profile()).await.unwrap();
    assert_eq!(landing.route, Route::Home);
    let id = landing.user_id.expect("record written");

    let stored = s.gateway.fetch_by_id(id.as_str()).await.into_payload();
    assert_eq!(stored, Some(UserRecord::from(profile())));
  }

  #[tokio::test]
  async fn every_sign_in_creates_a_record() {
    let (store, s) = sign_in(ProfileSync::BestEffort);
    s.complete(profile()).await.unwrap();
    s.complete(profile()).await.unwrap();
    assert_eq!(store.len("users").await, 2);
  }

  #[tokio::test]
  async fn best_effort_navigates_despite_failure() {
    let (store, s) = sign_in(ProfileSync::BestEffort);
    store.set_failing(true);
    let landing = s.complete(profile()).await.unwrap();
    assert_eq!(landing, Landing { route: Route::Home, user_id: None });
  }

  #[tokio::test]
  async fn required_surfaces_failure() {
    let (store, s) = sign_in(ProfileSync::Required);
    store.fail_next(1);
    let err = s.complete(profile()).await.unwrap_err();
    assert!(matches!(err, SignInError::ProfileSync(Failure::Store(_))));
  }
}
