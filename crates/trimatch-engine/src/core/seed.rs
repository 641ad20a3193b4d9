use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 128-bit seed for deterministic board layouts and policy fallbacks.
///
/// Serialized as a 32-character hex string. The same seed always produces the
/// same board for the same settings.
///
/// # Example
///
/// ```
/// use trimatch_engine::Seed;
/// use rand::Rng as _;
///
/// let seed: Seed = rand::rng().random();
/// let parsed: Seed = seed.to_string().parse().unwrap();
/// assert_eq!(seed, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: {reason}")]
pub struct ParseSeedError {
    input: String,
    reason: String,
}

impl Seed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates the random number generator driven by this seed.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = u128::from_be_bytes(self.0);
        write!(f, "{num:032x}")
    }
}

impl FromStr for Seed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError {
                input: s.to_owned(),
                reason: format!("expected 32 characters, got {}", s.len()),
            });
        }
        if let Some(ch) = s.chars().find(|ch| !ch.is_ascii_hexdigit()) {
            return Err(ParseSeedError {
                input: s.to_owned(),
                reason: format!("{ch:?} is not a hex digit"),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| ParseSeedError {
            input: s.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for Seed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<Seed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Seed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        Seed(seed)
    }
}
