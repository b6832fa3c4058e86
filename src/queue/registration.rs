use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistrationError;

pub const MOBILE_DIGITS: usize = 10;

/// A completed queue registration, ready for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub name: String,
    pub village: String,
    pub mobile: String,
    /// Optional. Empty when the patient skipped it.
    pub reason: String,
}

impl Registration {
    pub fn new(name: &str, village: &str, mobile: &str, reason: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            village: village.trim().to_string(),
            mobile: mobile.trim().to_string(),
            reason: reason.trim().to_string(),
        }
    }

    /// Same rules as the web join form: name, village and mobile are
    /// required, mobile is exactly ten digits.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.name.is_empty() {
            return Err(RegistrationError::MissingField("name"));
        }
        if self.village.is_empty() {
            return Err(RegistrationError::MissingField("village"));
        }
        if self.mobile.is_empty() {
            return Err(RegistrationError::MissingField("mobile"));
        }
        if !is_valid_mobile(&self.mobile) {
            return Err(RegistrationError::InvalidMobile);
        }
        Ok(())
    }
}

pub fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == MOBILE_DIGITS && mobile.bytes().all(|b| b.is_ascii_digit())
}

/// Placeholder number for registrations that never collected one.
/// Leading digit is 6-9 like an Indian mobile.
pub fn synthetic_mobile(rng: &mut dyn RngCore) -> String {
    let mut mobile = String::with_capacity(MOBILE_DIGITS);
    mobile.push(char::from(b'0' + rng.gen_range(6..=9u8)));
    for _ in 1..MOBILE_DIGITS {
        mobile.push(char::from(b'0' + rng.gen_range(0..=9u8)));
    }
    mobile
}
