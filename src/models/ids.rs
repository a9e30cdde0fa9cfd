//! Opaque identifiers.
//!
//! Internal record/step ids and the ids synthesized for Allure documents live in
//! separate newtypes so one can never be passed where the other is expected.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Generate a random UUID-v4 string.
///
/// Entropy comes from the operating system. If the OS source is unavailable a
/// clock-seeded pseudo-random generator is used instead; the result has the
/// same v4 shape either way.
pub fn generate_uuid() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid_from_bytes(bytes),
        Err(e) => {
            tracing::debug!("OS entropy unavailable ({}), using pseudo-random ids", e);
            pseudo_random_uuid(&mut clock_seeded_rng())
        }
    }
}

/// Generate a UUID-v4-shaped string from any random source.
pub fn pseudo_random_uuid<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid_from_bytes(bytes)
}

fn uuid_from_bytes(bytes: [u8; 16]) -> String {
    // Builder fixes the version (4) and variant (RFC 4122) nibbles.
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string()
}

fn clock_seeded_rng() -> StdRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    StdRng::seed_from_u64(nanos ^ u64::from(std::process::id()))
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Issue a fresh identifier.
            pub fn generate() -> Self {
                Self(generate_uuid())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a test case, fixed at creation.
    RecordId
);
opaque_id!(
    /// Identifier of a step, unique within its test case.
    StepId
);
opaque_id!(
    /// `uuid` of an Allure result document.
    AllureUuid
);
opaque_id!(
    /// `historyId` of an Allure result document.
    HistoryId
);
