//! User preferences: small scalars that default on first use.

use serde::{Deserialize, Serialize};

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  Light,
  #[default]
  Dark,
}

/// Whether the user has resolved the class-end alert permission request.
///
/// `Unrequested` means the question has never been answered, and is the only
/// state from which a transition is accepted. Once `Granted` or `Denied` the
/// flag stays put for the lifetime of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPermission {
  #[default]
  Unrequested,
  Granted,
  Denied,
}
