// Copyright (C) Microsoft Corporation. All rights reserved.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use webcrypto_token::soft::SoftToken;
use webcrypto_token::*;

/// Session wrapper that counts every token entry point it forwards.
///
/// `token_id` is a local attribute read and is deliberately not counted.
pub struct ProbeSession {
    inner: SoftToken,
    calls: AtomicUsize,
}

impl ProbeSession {
    pub fn new() -> Self {
        ProbeSession {
            inner: SoftToken::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TokenSession for ProbeSession {
    fn token_id(&self) -> TokenId {
        self.inner.token_id()
    }

    async fn sign_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn SignStream>, TokenError> {
        self.record();
        self.inner.sign_init(mechanism, key).await
    }

    async fn verify_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn VerifyStream>, TokenError> {
        self.record();
        self.inner.verify_init(mechanism, key).await
    }

    async fn encrypt_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn CipherStream>, TokenError> {
        self.record();
        self.inner.encrypt_init(mechanism, key).await
    }

    async fn decrypt_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn CipherStream>, TokenError> {
        self.record();
        self.inner.decrypt_init(mechanism, key).await
    }

    async fn generate_key(
        &self,
        mechanism: &Mechanism,
        template: &KeyTemplate,
    ) -> Result<KeyHandle, TokenError> {
        self.record();
        self.inner.generate_key(mechanism, template).await
    }

    async fn generate_key_pair(
        &self,
        mechanism: &Mechanism,
        public: &KeyTemplate,
        private: &KeyTemplate,
    ) -> Result<KeyPairHandle, TokenError> {
        self.record();
        self.inner.generate_key_pair(mechanism, public, private).await
    }

    async fn import_key(
        &self,
        template: &KeyTemplate,
        material: &[u8],
    ) -> Result<KeyHandle, TokenError> {
        self.record();
        self.inner.import_key(template, material).await
    }

    async fn export_key(&self, key: &KeyHandle) -> Result<Vec<u8>, TokenError> {
        self.record();
        self.inner.export_key(key).await
    }

    async fn destroy_key(&self, key: &KeyHandle) -> Result<(), TokenError> {
        self.record();
        self.inner.destroy_key(key).await
    }
}

/// Entry point with both bundled algorithm families registered.
pub fn common_crypto() -> TokenCrypto {
    let mut registry = AlgorithmRegistry::new();
    registry.register(Arc::new(families::AesCbc));
    registry.register(Arc::new(families::RsaPss));
    TokenCrypto::new(registry)
}
