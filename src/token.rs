// Copyright (C) Microsoft Corporation. All rights reserved.

//! Token session boundary.
//!
//! This is the consumed interface: a session hands out streaming contexts
//! for signing, verification and ciphering given a native [`Mechanism`] and
//! a [`KeyHandle`], plus the key lifecycle primitives concrete algorithm
//! families build on. The adapter drives contexts strictly in
//! update-then-finish order and never shares a context between operations;
//! `finish` consumes the context, so reuse is ruled out at the type level.

use async_trait::async_trait;
use thiserror::Error;

use crate::mech::Mechanism;
use crate::types::KeyHandle;
use crate::types::KeyRole;
use crate::types::KeyUsage;
use crate::types::TokenId;

/// Failures reported by a token session.
///
/// The adapter passes these through to callers unaltered; no retry or
/// reinterpretation happens above this boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The mechanism is not supported by this token.
    #[error("mechanism not supported by token")]
    MechanismNotSupported,

    /// Mechanism parameters are invalid for the referenced key.
    #[error("invalid mechanism parameters: {0}")]
    MechanismInvalid(String),

    /// No key object exists for the presented handle.
    #[error("key object not found")]
    KeyNotFound,

    /// The key object's attributes forbid the requested operation.
    #[error("key usage does not permit this operation")]
    UsageViolation,

    /// Export was requested for a non-extractable key.
    #[error("key is not extractable")]
    NotExtractable,

    /// Supplied key material is rejected by the token.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The underlying primitive failed.
    #[error("cryptographic operation failed: {0}")]
    OperationFailed(String),
}

/// Attribute template for keys created by generate/import/unwrap.
#[derive(Debug, Clone)]
pub struct KeyTemplate {
    /// Role of the key object to create.
    pub role: KeyRole,

    /// Whether export of the material is permitted.
    pub extractable: bool,

    /// Usage attributes, drawn from the caller's request.
    pub usages: Vec<KeyUsage>,

    /// Canonical algorithm name the key will belong to.
    pub algorithm: String,
}

/// Handles for the two halves of a generated key pair.
#[derive(Debug, Clone)]
pub struct KeyPairHandle {
    /// Public-half handle.
    pub public: KeyHandle,

    /// Private-half handle.
    pub private: KeyHandle,
}

/// Streaming signature-creation context.
#[async_trait]
pub trait SignStream: Send {
    /// Feed a chunk of message data.
    async fn update(&mut self, data: &[u8]) -> Result<(), TokenError>;

    /// Finalize and produce the signature. Consumes the context.
    async fn finish(self: Box<Self>) -> Result<Vec<u8>, TokenError>;
}

/// Streaming signature-verification context.
#[async_trait]
pub trait VerifyStream: Send {
    /// Feed a chunk of message data.
    async fn update(&mut self, data: &[u8]) -> Result<(), TokenError>;

    /// Finalize against the candidate signature. A structurally sound but
    /// non-matching signature yields `Ok(false)`, not an error.
    async fn finish(self: Box<Self>, signature: &[u8]) -> Result<bool, TokenError>;
}

/// Streaming cipher context, used for both encryption and decryption.
///
/// `update` may return any number of bytes, including zero when the token
/// buffers input internally; the caller concatenates update output with
/// finish output, in order, to form the complete result.
#[async_trait]
pub trait CipherStream: Send {
    /// Feed a chunk of input, receiving any output available so far.
    async fn update(&mut self, data: &[u8]) -> Result<Vec<u8>, TokenError>;

    /// Finalize and produce trailing output. Consumes the context.
    async fn finish(self: Box<Self>) -> Result<Vec<u8>, TokenError>;
}

/// A live session with a security token.
///
/// One session may serve many logical operations concurrently; every
/// streaming context it creates is owned exclusively by the operation that
/// requested it.
#[async_trait]
pub trait TokenSession: Send + Sync {
    /// Identity of the token this session speaks to. Key handles produced by
    /// other tokens are rejected during validation.
    fn token_id(&self) -> TokenId;

    /// Open a signing context.
    async fn sign_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn SignStream>, TokenError>;

    /// Open a verification context.
    async fn verify_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn VerifyStream>, TokenError>;

    /// Open an encryption context.
    async fn encrypt_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn CipherStream>, TokenError>;

    /// Open a decryption context.
    async fn decrypt_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn CipherStream>, TokenError>;

    /// Generate a symmetric key object.
    async fn generate_key(
        &self,
        mechanism: &Mechanism,
        template: &KeyTemplate,
    ) -> Result<KeyHandle, TokenError>;

    /// Generate an asymmetric key pair.
    async fn generate_key_pair(
        &self,
        mechanism: &Mechanism,
        public: &KeyTemplate,
        private: &KeyTemplate,
    ) -> Result<KeyPairHandle, TokenError>;

    /// Store externally supplied key material as a new key object.
    async fn import_key(
        &self,
        template: &KeyTemplate,
        material: &[u8],
    ) -> Result<KeyHandle, TokenError>;

    /// Read raw key material. The token enforces the extractable attribute.
    async fn export_key(&self, key: &KeyHandle) -> Result<Vec<u8>, TokenError>;

    /// Destroy a key object. Part of the token lifecycle; the adapter never
    /// calls this on its own.
    async fn destroy_key(&self, key: &KeyHandle) -> Result<(), TokenError>;
}
