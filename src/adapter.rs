// Copyright (C) Microsoft Corporation. All rights reserved.

//! The algorithm-family contract and its shared validation pipeline.
//!
//! [`AlgorithmFamily`] is the extensibility seam every concrete algorithm
//! family implements. The provided method bodies carry the pipeline shared
//! by all families:
//!
//! 1. capability gate
//! 2. identity check (canonical name, case-insensitive)
//! 3. extensible per-parameter checks ([`AlgorithmFamily::check`])
//! 4. key role check ([`AlgorithmFamily::role_for`])
//! 5. mechanism resolution ([`AlgorithmFamily::mechanism`])
//! 6. streaming token calls, finalize, deliver
//!
//! Steps 1–5 are synchronous and complete before the first `.await`, so no
//! token call ever observes a partially validated request. Each invocation
//! is stateless with respect to the family; all state lives in the token
//! session and its key handles.

use async_trait::async_trait;

use crate::checks;
use crate::error::AdapterError;
use crate::mech::Mechanism;
use crate::token::KeyPairHandle;
use crate::token::TokenSession;
use crate::types::AlgorithmDescriptor;
use crate::types::ExportedKey;
use crate::types::KeyData;
use crate::types::KeyFormat;
use crate::types::KeyHandle;
use crate::types::KeyRole;
use crate::types::KeyUsage;

/// The uniform operation vocabulary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum Operation {
    /// Key or key-pair generation.
    #[strum(serialize = "generate-key")]
    GenerateKey,

    /// Signature creation.
    #[strum(serialize = "sign")]
    Sign,

    /// Signature verification.
    #[strum(serialize = "verify")]
    Verify,

    /// Encryption.
    #[strum(serialize = "encrypt")]
    Encrypt,

    /// Decryption.
    #[strum(serialize = "decrypt")]
    Decrypt,

    /// Key wrapping (export + encrypt).
    #[strum(serialize = "wrap-key")]
    WrapKey,

    /// Key unwrapping (decrypt + import).
    #[strum(serialize = "unwrap-key")]
    UnwrapKey,

    /// Key derivation.
    #[strum(serialize = "derive-key")]
    DeriveKey,

    /// Key export.
    #[strum(serialize = "export-key")]
    ExportKey,

    /// Key import.
    #[strum(serialize = "import-key")]
    ImportKey,
}

/// A single request parameter handed to the extensible check hook.
#[derive(Debug, Copy, Clone)]
pub enum OpParam<'a> {
    /// The canonicalized algorithm descriptor.
    Algorithm(&'a AlgorithmDescriptor),

    /// The key handle named by the request.
    Key(&'a KeyHandle),

    /// The data argument.
    Data(&'a [u8]),

    /// The signature argument (verify only).
    Signature(&'a [u8]),
}

/// Outcome of a generate operation: a single key or a key pair.
#[derive(Debug, Clone)]
pub enum KeyGenOutcome {
    /// A symmetric secret key.
    Key(KeyHandle),

    /// An asymmetric key pair.
    KeyPair(KeyPairHandle),
}

/// Contract implemented by every concrete algorithm family.
///
/// Families declare their canonical name and capability set, translate
/// validated descriptors into token-native mechanisms, and may tighten the
/// per-call checks. The streaming operation bodies are provided here and
/// rarely need overriding; the key lifecycle operations default to
/// [`AdapterError::NotSupported`] and are overridden per declared
/// capability.
#[async_trait]
pub trait AlgorithmFamily: std::fmt::Debug + Send + Sync {
    /// Canonical algorithm name. Requests must match it case-insensitively.
    fn name(&self) -> &'static str;

    /// Operations this family implements. Undeclared operations fail with
    /// [`AdapterError::NotSupported`] before any other validation.
    fn capabilities(&self) -> &'static [Operation];

    /// Extensible per-call check hook, invoked once per request parameter
    /// in declaration order. The base hook accepts everything; families add
    /// constraints (required parameters, allowed hash set, key sizes)
    /// without altering the pipeline shape.
    fn check(&self, operation: Operation, param: OpParam<'_>) -> Result<(), AdapterError> {
        let _ = (operation, param);
        Ok(())
    }

    /// Expected key role for an operation, or `None` when only handle
    /// presence and token ownership are checked. Signing requires a private
    /// key and verification a public key by default; cipher operations are
    /// family-specific.
    fn role_for(&self, operation: Operation) -> Option<KeyRole> {
        match operation {
            Operation::Sign => Some(KeyRole::Private),
            Operation::Verify => Some(KeyRole::Public),
            _ => None,
        }
    }

    /// Translate a validated descriptor and key into a token-native
    /// mechanism. There is no default translation; every family must supply
    /// this for each streaming operation it declares.
    fn mechanism(
        &self,
        operation: Operation,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
    ) -> Result<Mechanism, AdapterError> {
        let _ = (algorithm, key);
        Err(AdapterError::not_supported(self.name(), operation))
    }

    /// Capability gate shared by all operations.
    fn ensure_supported(&self, operation: Operation) -> Result<(), AdapterError> {
        if self.capabilities().contains(&operation) {
            Ok(())
        } else {
            Err(AdapterError::not_supported(self.name(), operation))
        }
    }

    /// Sign `data` with a private key, producing signature bytes.
    async fn sign(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>, AdapterError> {
        self.ensure_supported(Operation::Sign)?;
        let algorithm = checks::check_algorithm(self.name(), algorithm)?;
        self.check(Operation::Sign, OpParam::Algorithm(&algorithm))?;
        self.check(Operation::Sign, OpParam::Key(key))?;
        self.check(Operation::Sign, OpParam::Data(data))?;
        self.check_role(session, Operation::Sign, key)?;
        let mechanism = self.mechanism(Operation::Sign, &algorithm, key)?;
        tracing::debug!(algorithm = %algorithm.name, key = key.id().0, "sign");

        let mut ctx = session.sign_init(&mechanism, key).await?;
        ctx.update(data).await?;
        Ok(ctx.finish().await?)
    }

    /// Verify `signature` over `data` with a public key.
    ///
    /// A structurally sound but non-matching signature yields `Ok(false)`;
    /// only validation and token failures are errors.
    async fn verify(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool, AdapterError> {
        self.ensure_supported(Operation::Verify)?;
        let algorithm = checks::check_algorithm(self.name(), algorithm)?;
        self.check(Operation::Verify, OpParam::Algorithm(&algorithm))?;
        self.check(Operation::Verify, OpParam::Key(key))?;
        self.check(Operation::Verify, OpParam::Data(data))?;
        self.check(Operation::Verify, OpParam::Signature(signature))?;
        self.check_role(session, Operation::Verify, key)?;
        let mechanism = self.mechanism(Operation::Verify, &algorithm, key)?;
        tracing::debug!(algorithm = %algorithm.name, key = key.id().0, "verify");

        let mut ctx = session.verify_init(&mechanism, key).await?;
        ctx.update(data).await?;
        Ok(ctx.finish(signature).await?)
    }

    /// Encrypt `data`, concatenating the update and finalize outputs of the
    /// token cipher context in order.
    async fn encrypt(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>, AdapterError> {
        self.ensure_supported(Operation::Encrypt)?;
        let algorithm = checks::check_algorithm(self.name(), algorithm)?;
        self.check(Operation::Encrypt, OpParam::Algorithm(&algorithm))?;
        self.check(Operation::Encrypt, OpParam::Key(key))?;
        self.check(Operation::Encrypt, OpParam::Data(data))?;
        self.check_role(session, Operation::Encrypt, key)?;
        let mechanism = self.mechanism(Operation::Encrypt, &algorithm, key)?;
        tracing::debug!(algorithm = %algorithm.name, key = key.id().0, "encrypt");

        let mut ctx = session.encrypt_init(&mechanism, key).await?;
        let mut out = ctx.update(data).await?;
        out.extend(ctx.finish().await?);
        Ok(out)
    }

    /// Decrypt `data`, with the same update-plus-finalize concatenation
    /// contract as [`encrypt`](Self::encrypt).
    async fn decrypt(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        key: &KeyHandle,
        data: &[u8],
    ) -> Result<Vec<u8>, AdapterError> {
        self.ensure_supported(Operation::Decrypt)?;
        let algorithm = checks::check_algorithm(self.name(), algorithm)?;
        self.check(Operation::Decrypt, OpParam::Algorithm(&algorithm))?;
        self.check(Operation::Decrypt, OpParam::Key(key))?;
        self.check(Operation::Decrypt, OpParam::Data(data))?;
        self.check_role(session, Operation::Decrypt, key)?;
        let mechanism = self.mechanism(Operation::Decrypt, &algorithm, key)?;
        tracing::debug!(algorithm = %algorithm.name, key = key.id().0, "decrypt");

        let mut ctx = session.decrypt_init(&mechanism, key).await?;
        let mut out = ctx.update(data).await?;
        out.extend(ctx.finish().await?);
        Ok(out)
    }

    /// Generate a key or key pair.
    async fn generate_key(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyGenOutcome, AdapterError> {
        let _ = (session, algorithm, extractable, usages);
        Err(AdapterError::not_supported(
            self.name(),
            Operation::GenerateKey,
        ))
    }

    /// Derive a new key from a base key.
    async fn derive_key(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        base_key: &KeyHandle,
        derived_algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle, AdapterError> {
        let _ = (
            session,
            algorithm,
            base_key,
            derived_algorithm,
            extractable,
            usages,
        );
        Err(AdapterError::not_supported(
            self.name(),
            Operation::DeriveKey,
        ))
    }

    /// Export a key as raw bytes or a structured interchange record.
    async fn export_key(
        &self,
        session: &dyn TokenSession,
        format: KeyFormat,
        key: &KeyHandle,
    ) -> Result<ExportedKey, AdapterError> {
        let _ = (session, format, key);
        Err(AdapterError::not_supported(
            self.name(),
            Operation::ExportKey,
        ))
    }

    /// Import key material, producing a new key handle.
    async fn import_key(
        &self,
        session: &dyn TokenSession,
        format: KeyFormat,
        data: KeyData,
        algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle, AdapterError> {
        let _ = (session, format, data, algorithm, extractable, usages);
        Err(AdapterError::not_supported(
            self.name(),
            Operation::ImportKey,
        ))
    }

    /// Role check shared by the streaming pipelines: role match when the
    /// family expects a specific role, handle presence and token ownership
    /// always.
    fn check_role(
        &self,
        session: &dyn TokenSession,
        operation: Operation,
        key: &KeyHandle,
    ) -> Result<(), AdapterError> {
        match self.role_for(operation) {
            Some(role) => checks::check_key(session.token_id(), Some(key), role),
            None => checks::check_handle(session.token_id(), Some(key)).map(|_| ()),
        }
    }
}
