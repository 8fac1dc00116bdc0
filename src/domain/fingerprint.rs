use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content-derived cache key: SHA-256 over the input bytes plus every
/// parameter that influences the analysis outcome.
///
/// The same fingerprint must always map to the same result, so any new
/// parameter that changes the output has to be folded in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

/// Parameters folded into the fingerprint alongside the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintParams {
    pub model: String,
    pub language: String,
    pub advice_enabled: bool,
}

impl Fingerprint {
    pub fn compute(data: &[u8], params: &FingerprintParams) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.update(params.model.as_bytes());
        hasher.update([0u8]);
        hasher.update(params.language.as_bytes());
        hasher.update([0u8]);
        hasher.update([params.advice_enabled as u8]);
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
