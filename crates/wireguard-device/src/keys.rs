//! `WireGuard` public keys.
//!
//! `WireGuard` identifies peers by their Curve25519 public key. Keys are 32
//! bytes and are rendered as padded standard base64, exactly as `wg(8)`
//! prints them.

use std::fmt;
use std::str::FromStr;

use base64::Engine;

use crate::error::DeviceError;

/// `WireGuard` key size in bytes (256-bit Curve25519 keys).
pub const KEY_SIZE: usize = 32;

/// A `WireGuard` public key (Curve25519, 32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; KEY_SIZE]);

impl PublicKey {
    /// Creates a public key from raw bytes.
    #[must_use]
    pub const fn from_bytes_array(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a public key from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeviceError> {
        let arr: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| DeviceError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Returns the raw bytes of the public key.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Returns true for the all-zero key, which `WireGuard` uses to mean "unset".
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Encodes the key as base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.0)
    }

    /// Decodes a public key from base64.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid base64 or wrong length.
    pub fn from_base64(s: &str) -> Result<Self, DeviceError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|e| DeviceError::InvalidBase64(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b64 = self.to_base64();
        let short = &b64[..8.min(b64.len())];
        write!(f, "PublicKey({short}...)")
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl FromStr for PublicKey {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_matches_wg_format() {
        let key = PublicKey::from_bytes_array([0xAB; KEY_SIZE]);
        let encoded = key.to_base64();
        assert_eq!(encoded.len(), 44);
        assert!(encoded.ends_with('='));
        assert_eq!(key.to_string(), encoded);
    }

    #[test]
    fn parse_from_str() {
        let key = PublicKey::from_bytes_array([7u8; KEY_SIZE]);
        let parsed: PublicKey = key.to_base64().parse().expect("valid key");
        assert_eq!(parsed, key);
    }

    #[test]
    fn invalid_key_length_rejected() {
        let short_bytes = [0u8; 16];
        assert!(matches!(
            PublicKey::from_bytes(&short_bytes),
            Err(DeviceError::InvalidKeyLength(16))
        ));
    }

    #[test]
    fn invalid_base64_rejected() {
        assert!(matches!(
            PublicKey::from_base64("not base64!"),
            Err(DeviceError::InvalidBase64(_))
        ));
        // Valid base64, wrong length.
        assert!(matches!(
            PublicKey::from_base64("YWJj"),
            Err(DeviceError::InvalidKeyLength(3))
        ));
    }

    #[test]
    fn zero_key_detected() {
        assert!(PublicKey::from_bytes_array([0u8; KEY_SIZE]).is_zero());
        let mut bytes = [0u8; KEY_SIZE];
        bytes[31] = 1;
        assert!(!PublicKey::from_bytes_array(bytes).is_zero());
    }

    #[test]
    fn debug_is_abbreviated() {
        let key = PublicKey::from_bytes_array([0xAB; KEY_SIZE]);
        let debug = format!("{key:?}");
        assert!(debug.starts_with("PublicKey("));
        assert!(debug.len() < key.to_base64().len());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn public_key_base64_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
                let public = PublicKey::from_bytes_array(bytes);
                let decoded = PublicKey::from_base64(&public.to_base64());
                prop_assert!(decoded.is_ok());
                prop_assert_eq!(*decoded.unwrap().as_bytes(), bytes);
            }
        }
    }
}
