// Copyright (C) Microsoft Corporation. All rights reserved.

use serde::Deserialize;
use serde::Serialize;

use crate::error::AdapterError;
use crate::types::KeyUsage;

/// Export/interchange format selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum KeyFormat {
    /// Opaque key material bytes.
    #[strum(serialize = "raw")]
    Raw,

    /// Structured interchange record, serialized as UTF-8 JSON when it
    /// crosses a byte-oriented boundary.
    #[strum(serialize = "jwk")]
    Jwk,
}

/// Structured interchange record for a key.
///
/// Field order is fixed by the struct definition, so serialization to JSON
/// bytes is deterministic and round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type tag, e.g. `"oct"` for symmetric keys.
    pub kty: String,

    /// Extractability flag.
    pub ext: bool,

    /// Operation vocabulary recorded on the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<KeyUsage>>,

    /// Legacy single-string usage field; retained for interchange
    /// compatibility, never produced by this crate.
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Algorithm tag, e.g. `"A256CBC"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Base64url-encoded key material for symmetric keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
}

impl Jwk {
    /// Serialize to the deterministic UTF-8 JSON byte form used when the
    /// record crosses a byte-oriented boundary (wrapping).
    pub fn to_bytes(&self) -> Result<Vec<u8>, AdapterError> {
        serde_json::to_vec(self).map_err(|e| AdapterError::Format(e.to_string()))
    }

    /// Parse the byte form back into a record. Malformed payloads are a
    /// format error, distinct from any decryption failure that preceded
    /// parsing.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AdapterError> {
        serde_json::from_slice(bytes).map_err(|e| AdapterError::Format(e.to_string()))
    }
}

/// Result of an export operation: raw bytes or a structured record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportedKey {
    /// Raw key material.
    Raw(Vec<u8>),

    /// Structured interchange record.
    Jwk(Jwk),
}

impl ExportedKey {
    /// Byte form of the exported key, serializing structured records to
    /// deterministic JSON. Used by the wrap composite.
    pub fn into_bytes(self) -> Result<Vec<u8>, AdapterError> {
        match self {
            ExportedKey::Raw(bytes) => Ok(bytes),
            ExportedKey::Jwk(jwk) => jwk.to_bytes(),
        }
    }
}

/// Key material supplied to an import operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyData {
    /// Raw key material.
    Raw(Vec<u8>),

    /// Structured interchange record.
    Jwk(Jwk),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_jwk() -> Jwk {
        Jwk {
            kty: "oct".to_owned(),
            ext: true,
            key_ops: Some(vec![KeyUsage::Encrypt, KeyUsage::Decrypt]),
            usage: None,
            alg: Some("A256CBC".to_owned()),
            k: Some("AAECAwQFBgcICQoLDA0ODw".to_owned()),
        }
    }

    #[test]
    fn test_jwk_byte_round_trip_is_exact() {
        let jwk = secret_jwk();
        let bytes = jwk.to_bytes().unwrap();
        let parsed = Jwk::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, jwk);

        // Deterministic: repeated serialization yields identical bytes.
        assert_eq!(jwk.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_jwk_serializes_usage_vocabulary() {
        let bytes = secret_jwk().to_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"key_ops\":[\"encrypt\",\"decrypt\"]"));
        assert!(text.contains("\"kty\":\"oct\""));
        // Absent optional fields are omitted entirely.
        assert!(!text.contains("\"use\""));
    }

    #[test]
    fn test_format_parses_case_insensitively() {
        assert_eq!("raw".parse::<KeyFormat>(), Ok(KeyFormat::Raw));
        assert_eq!("JWK".parse::<KeyFormat>(), Ok(KeyFormat::Jwk));
        assert!("pkcs8".parse::<KeyFormat>().is_err());
    }

    #[test]
    fn test_malformed_record_is_format_error() {
        let err = Jwk::from_bytes(b"{\"kty\":").unwrap_err();
        assert!(matches!(err, AdapterError::Format(_)));
    }
}
