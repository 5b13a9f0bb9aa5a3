// Copyright (C) Microsoft Corporation. All rights reserved.

use serde::Deserialize;
use serde::Serialize;

/// Identifier of a key object inside a token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

/// Identity tag of a token instance.
///
/// Key handles carry the id of the token that produced them; the validation
/// pipeline rejects handles presented to a session of a different token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TokenId(pub u64);

/// Role of the key material referenced by a handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum KeyRole {
    /// Private half of an asymmetric key pair.
    #[strum(serialize = "private")]
    Private,

    /// Public half of an asymmetric key pair.
    #[strum(serialize = "public")]
    Public,

    /// Symmetric secret key.
    #[strum(serialize = "secret")]
    Secret,
}

/// Operation vocabulary attached to a key at creation time.
///
/// Usages are drawn from the caller's request; the base adapter records them
/// on the handle without independent validation. Tokens may enforce them when
/// an operation is executed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum KeyUsage {
    /// Create signatures.
    #[serde(rename = "sign")]
    #[strum(serialize = "sign")]
    Sign,

    /// Verify signatures.
    #[serde(rename = "verify")]
    #[strum(serialize = "verify")]
    Verify,

    /// Encrypt data.
    #[serde(rename = "encrypt")]
    #[strum(serialize = "encrypt")]
    Encrypt,

    /// Decrypt data.
    #[serde(rename = "decrypt")]
    #[strum(serialize = "decrypt")]
    Decrypt,

    /// Wrap other keys.
    #[serde(rename = "wrap-key")]
    #[strum(serialize = "wrap-key")]
    WrapKey,

    /// Unwrap other keys.
    #[serde(rename = "unwrap-key")]
    #[strum(serialize = "unwrap-key")]
    UnwrapKey,

    /// Derive new keys.
    #[serde(rename = "derive-key")]
    #[strum(serialize = "derive-key")]
    DeriveKey,
}

/// Opaque reference to key material held by a token.
///
/// Handles are created by token operations (generate, import, unwrap) and
/// destroyed by the token-session lifecycle; the adapter never owns key
/// destruction and never mutates a handle. Handles are freely shareable
/// read-only across concurrent operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHandle {
    id: ObjectId,
    token: TokenId,
    role: KeyRole,
    extractable: bool,
    usages: Vec<KeyUsage>,
    algorithm: String,
}

impl KeyHandle {
    /// Construct a handle. Intended for token-session implementations; the
    /// adapter itself only reads handles.
    pub fn new(
        id: ObjectId,
        token: TokenId,
        role: KeyRole,
        extractable: bool,
        usages: Vec<KeyUsage>,
        algorithm: impl Into<String>,
    ) -> Self {
        KeyHandle {
            id,
            token,
            role,
            extractable,
            usages,
            algorithm: algorithm.into(),
        }
    }

    /// Object id inside the owning token.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Identity of the token that produced this handle.
    pub fn token(&self) -> TokenId {
        self.token
    }

    /// Role of the referenced key material.
    pub fn role(&self) -> KeyRole {
        self.role
    }

    /// Whether export of the key material is permitted.
    pub fn extractable(&self) -> bool {
        self.extractable
    }

    /// Usages recorded at creation time.
    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    /// Whether a given usage was recorded at creation time.
    pub fn allows(&self, usage: KeyUsage) -> bool {
        self.usages.contains(&usage)
    }

    /// Canonical name of the algorithm family this key belongs to.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }
}
