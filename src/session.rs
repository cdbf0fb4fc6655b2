//! Login state backed by the preferences store.
//!
//! There is no real authentication: any well-formed email and password is
//! accepted and a token derived from them is stored.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::{info, warn};

use crate::prefs::{self, KeyValueStore, TOKEN_KEY};

const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.(com|net|org|edu|gov|mil|info|io|gmail|hotmail|yahoo|outlook)$",
  )
  .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
  #[error("Email is required")]
  EmailRequired,

  #[error("Email must contain @")]
  EmailMissingAt,

  #[error("Please enter a valid email address (e.g., user@gmail.com)")]
  InvalidEmail,

  #[error("Password is required")]
  PasswordRequired,

  #[error("Password must be at least 6 characters")]
  PasswordTooShort,

  #[error("Could not save session: {0}")]
  Storage(String),
}

/// Check an email address, returning the first problem found
pub fn validate_email(email: &str) -> Result<(), LoginError> {
  let email = email.trim();
  if email.is_empty() {
    return Err(LoginError::EmailRequired);
  }
  if !email.contains('@') {
    return Err(LoginError::EmailMissingAt);
  }
  if !EMAIL_RE.is_match(email) {
    return Err(LoginError::InvalidEmail);
  }
  Ok(())
}

pub fn validate_password(password: &str) -> Result<(), LoginError> {
  if password.is_empty() {
    return Err(LoginError::PasswordRequired);
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(LoginError::PasswordTooShort);
  }
  Ok(())
}

#[derive(Clone)]
pub struct Session {
  store: Arc<dyn KeyValueStore>,
}

impl Session {
  pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
    Self { store }
  }

  pub fn is_authenticated(&self) -> bool {
    match self.store.get(TOKEN_KEY) {
      Ok(token) => token.is_some_and(|t| !t.is_empty()),
      Err(e) => {
        warn!("failed to read session token: {}", e);
        false
      }
    }
  }

  /// Validate the credentials and store a token derived from them
  pub fn login(&self, email: &str, password: &str) -> Result<(), LoginError> {
    validate_email(email)?;
    validate_password(password)?;

    let email = email.trim();
    let token = token_for(email, password);
    self
      .store
      .set(TOKEN_KEY, &token)
      .map_err(|e| LoginError::Storage(e.to_string()))?;

    info!(email, "logged in");
    Ok(())
  }

  /// Forget the token along with every stored page and filter
  pub fn logout(&self) {
    prefs::clear_all(self.store.as_ref());
    info!("logged out");
  }
}

/// Token stored for a login. Hashed so credentials never hit disk in clear.
fn token_for(email: &str, password: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(email.as_bytes());
  hasher.update(b":");
  hasher.update(password.as_bytes());
  hex::encode(hasher.finalize())
}
