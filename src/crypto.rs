// Copyright (C) Microsoft Corporation. All rights reserved.

//! The uniform key-operations entry point.
//!
//! [`TokenCrypto`] resolves the algorithm family for each request and
//! delegates the primitive operations to the family pipeline. The two
//! composite operations live here because they may span families: the key
//! being wrapped names its own family for export, while the wrapping
//! algorithm names the family that encrypts. Composites are pure pipelines
//! over the primitives, fail at the first failing step, and perform no
//! compensating action.

use crate::adapter::KeyGenOutcome;
use crate::adapter::Operation;
use crate::error::AdapterError;
use crate::registry::AlgorithmRegistry;
use crate::token::TokenSession;
use crate::types::AlgorithmDescriptor;
use crate::types::ExportedKey;
use crate::types::Jwk;
use crate::types::KeyData;
use crate::types::KeyFormat;
use crate::types::KeyHandle;
use crate::types::KeyUsage;

/// Algorithm-agnostic key operations over a token session.
pub struct TokenCrypto {
    registry: AlgorithmRegistry,
}

impl TokenCrypto {
    /// Build the entry point over a populated registry.
    pub fn new(registry: AlgorithmRegistry) -> Self {
        TokenCrypto { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Generate a key or key pair for `algorithm`.
    pub async fn generate_key(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyGenOutcome, AdapterError> {
        self.registry
            .resolve(&algorithm.name, Operation::GenerateKey)?
            .generate_key(session, algorithm, extractable, usages)
            .await
    }

    /// Sign `data` with a private key.
    pub async fn sign(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>, AdapterError> {
        self.registry
            .resolve(&algorithm.name, Operation::Sign)?
            .sign(session, algorithm, key, data)
            .await
    }

    /// Verify `signature` over `data` with a public key.
    pub async fn verify(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool, AdapterError> {
        self.registry
            .resolve(&algorithm.name, Operation::Verify)?
            .verify(session, algorithm, key, signature, data)
            .await
    }

    /// Encrypt `data`.
    pub async fn encrypt(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>, AdapterError> {
        self.registry
            .resolve(&algorithm.name, Operation::Encrypt)?
            .encrypt(session, algorithm, key, data)
            .await
    }

    /// Decrypt `data`.
    pub async fn decrypt(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>, AdapterError> {
        self.registry
            .resolve(&algorithm.name, Operation::Decrypt)?
            .decrypt(session, algorithm, key, data)
            .await
    }

    /// Derive a new key from `base_key`.
    pub async fn derive_key(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        base_key: &KeyHandle,
        derived_algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle, AdapterError> {
        self.registry
            .resolve(&algorithm.name, Operation::DeriveKey)?
            .derive_key(
                session,
                algorithm,
                base_key,
                derived_algorithm,
                extractable,
                usages,
            )
            .await
    }

    /// Export `key` in the requested format. The key's own algorithm family
    /// performs the export.
    pub async fn export_key(
        &self,
        session: &dyn TokenSession,
        format: KeyFormat,
        key: &KeyHandle,
    ) -> Result<ExportedKey, AdapterError> {
        self.registry
            .resolve(key.algorithm(), Operation::ExportKey)?
            .export_key(session, format, key)
            .await
    }

    /// Import key material for `algorithm`, producing a new key handle.
    pub async fn import_key(
        &self,
        session: &dyn TokenSession,
        format: KeyFormat,
        data: KeyData,
        algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle, AdapterError> {
        self.registry
            .resolve(&algorithm.name, Operation::ImportKey)?
            .import_key(session, format, data, algorithm, extractable, usages)
            .await
    }

    /// Wrap `key` with `wrapping_key`: export, serialize structured records
    /// to deterministic JSON bytes, then encrypt under `wrap_algorithm`.
    ///
    /// Extractability and format support are delegated to the export step;
    /// the wrapping key's role suitability is enforced by the encrypt
    /// pipeline.
    pub async fn wrap_key(
        &self,
        session: &dyn TokenSession,
        format: KeyFormat,
        key: &KeyHandle,
        wrapping_key: &KeyHandle,
        wrap_algorithm: &AlgorithmDescriptor,
    ) -> Result<Vec<u8>, AdapterError> {
        let wrapper = self
            .registry
            .resolve(&wrap_algorithm.name, Operation::WrapKey)?;
        wrapper.ensure_supported(Operation::WrapKey)?;
        tracing::debug!(
            algorithm = %wrap_algorithm.name,
            format = %format,
            key = key.id().0,
            "wrap key"
        );

        let exported = self
            .registry
            .resolve(key.algorithm(), Operation::ExportKey)?
            .export_key(session, format, key)
            .await?;
        let serialized = exported.into_bytes()?;
        wrapper
            .encrypt(session, wrap_algorithm, wrapping_key, &serialized)
            .await
    }

    /// Unwrap `wrapped` with `unwrapping_key`: decrypt under
    /// `unwrap_algorithm`, parse the plaintext when `format` is structured
    /// (parse failure is a format error, distinct from decryption failure),
    /// then import for `target_algorithm`.
    #[allow(clippy::too_many_arguments)]
    pub async fn unwrap_key(
        &self,
        session: &dyn TokenSession,
        format: KeyFormat,
        wrapped: &[u8],
        unwrapping_key: &KeyHandle,
        unwrap_algorithm: &AlgorithmDescriptor,
        target_algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle, AdapterError> {
        let unwrapper = self
            .registry
            .resolve(&unwrap_algorithm.name, Operation::UnwrapKey)?;
        unwrapper.ensure_supported(Operation::UnwrapKey)?;
        tracing::debug!(
            algorithm = %unwrap_algorithm.name,
            format = %format,
            "unwrap key"
        );

        let plaintext = unwrapper
            .decrypt(session, unwrap_algorithm, unwrapping_key, wrapped)
            .await?;
        let data = match format {
            KeyFormat::Raw => KeyData::Raw(plaintext),
            KeyFormat::Jwk => KeyData::Jwk(Jwk::from_bytes(&plaintext)?),
        };
        self.registry
            .resolve(&target_algorithm.name, Operation::ImportKey)?
            .import_key(session, format, data, target_algorithm, extractable, usages)
            .await
    }
}
