// Copyright (C) Microsoft Corporation. All rights reserved.

//! Token-native mechanism descriptors.
//!
//! A mechanism names exactly which cryptographic primitive a token should
//! run, with its parameters fully resolved. Algorithm families translate
//! validated [`AlgorithmDescriptor`](crate::AlgorithmDescriptor)s into
//! mechanisms; tokens consume them without further interpretation.

/// Hash primitive selector carried inside mechanisms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum HashKind {
    /// SHA-1 (legacy interchange only).
    #[strum(serialize = "SHA-1")]
    Sha1,

    /// SHA-256.
    #[strum(serialize = "SHA-256")]
    Sha256,

    /// SHA-384.
    #[strum(serialize = "SHA-384")]
    Sha384,

    /// SHA-512.
    #[strum(serialize = "SHA-512")]
    Sha512,
}

impl HashKind {
    /// Digest output length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashKind::Sha1 => 20,
            HashKind::Sha256 => 32,
            HashKind::Sha384 => 48,
            HashKind::Sha512 => 64,
        }
    }

    /// Parse the canonical hash algorithm name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("SHA-1") {
            Some(HashKind::Sha1)
        } else if name.eq_ignore_ascii_case("SHA-256") {
            Some(HashKind::Sha256)
        } else if name.eq_ignore_ascii_case("SHA-384") {
            Some(HashKind::Sha384)
        } else if name.eq_ignore_ascii_case("SHA-512") {
            Some(HashKind::Sha512)
        } else {
            None
        }
    }
}

/// AES-CBC block and IV length in bytes.
pub const AES_CBC_IV_LEN: usize = 16;

/// Native mechanism descriptor consumed by token sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mechanism {
    /// AES secret key generation.
    AesKeyGen {
        /// Key length in bits: 128, 192 or 256.
        bits: usize,
    },

    /// AES in CBC mode.
    AesCbc {
        /// Initialization vector.
        iv: [u8; AES_CBC_IV_LEN],

        /// PKCS#7 padding on the final block.
        pad: bool,
    },

    /// RSA key-pair generation.
    RsaKeyPairGen {
        /// Modulus length in bits.
        modulus_bits: usize,
    },

    /// RSASSA-PSS signature.
    RsaPss {
        /// Digest fed to the padding scheme.
        hash: HashKind,

        /// Salt length in bytes.
        salt_len: usize,
    },
}
