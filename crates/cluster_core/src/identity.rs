//! Id allocation, secret keys, and naming rules.
//!
//! Every entity id comes from a single monotonic allocator that is persisted
//! with the world, so ids are never reused across restarts. Secret keys are
//! capability tokens: whoever presents a crew or ship key controls it.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Characters a secret key is drawn from.
const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated secret key.
const KEY_LENGTH: usize = 16;

/// Characters a planet name is drawn from.
const PLANET_NAME_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Characters per half of a planet name (`XXX-XXX`).
const PLANET_NAME_HALF: usize = 3;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a crew.
    CrewId
);
entity_id!(
    /// Unique identifier for a ship.
    ShipId
);
entity_id!(
    /// Unique identifier for a planet.
    PlanetId
);
entity_id!(
    /// Unique identifier for a crew member.
    MemberId
);
entity_id!(
    /// Identifier for a connected session. Transient: never persisted.
    SessionId
);

/// Monotonic id source shared by all entity types.
///
/// Serialized with the world snapshot so a restored world continues
/// allocating where the saved one stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator starting at id 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Create an allocator that resumes from a persisted watermark.
    #[must_use]
    pub const fn resume_from(next: u64) -> Self {
        Self { next }
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The next id that would be allocated (the persistence watermark).
    #[must_use]
    pub const fn watermark(&self) -> u64 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A server-generated capability token for a crew or ship.
///
/// Only ever exposed at creation time or to the rightful holder. The
/// `Debug` impl redacts the value so keys cannot leak through logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    /// Generate a fresh random key.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let key = (0..KEY_LENGTH)
            .map(|_| char::from(KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())]))
            .collect();
        Self(key)
    }

    /// Check a presented key against this one.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        self.0 == presented
    }

    /// The key text, for handing to the rightful holder at creation time.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Validate a player-chosen name (ship or captain).
///
/// A valid name starts with an ASCII letter followed by 1 to 29 ASCII
/// alphanumerics.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    let rest = chars.as_str();
    if rest.is_empty() || rest.len() > 29 {
        return false;
    }
    rest.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Generate a planet designation of the form `XXX-XXX`.
pub fn generate_planet_name<R: Rng>(rng: &mut R) -> String {
    let mut name = String::with_capacity(PLANET_NAME_HALF * 2 + 1);
    for half in 0..2 {
        if half == 1 {
            name.push('-');
        }
        for _ in 0..PLANET_NAME_HALF {
            name.push(char::from(
                PLANET_NAME_ALPHABET[rng.gen_range(0..PLANET_NAME_ALPHABET.len())],
            ));
        }
    }
    name
}
