use serde::{Deserialize, Serialize};
use std::fmt;

/// Balance type
pub type Balance = u128;

/// Validator stash identified by its SS58 address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Validator {
    pub address: String,
}

impl Validator {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
