// Copyright (C) Microsoft Corporation. All rights reserved.

use std::collections::HashMap;

use rsa::RsaPrivateKey;
use rsa::RsaPublicKey;
use zeroize::Zeroizing;

use crate::token::TokenError;
use crate::types::KeyRole;
use crate::types::KeyUsage;
use crate::types::ObjectId;

/// Key material held by the soft token.
#[derive(Clone)]
pub(crate) enum KeyMaterial {
    /// Symmetric or generic secret bytes, zeroized on drop.
    Secret(Zeroizing<Vec<u8>>),

    /// RSA private key.
    RsaPrivate(Box<RsaPrivateKey>),

    /// RSA public key.
    RsaPublic(RsaPublicKey),
}

/// A key object and its attributes.
#[derive(Clone)]
pub(crate) struct KeyObject {
    pub material: KeyMaterial,
    pub role: KeyRole,
    pub extractable: bool,
    pub usages: Vec<KeyUsage>,
}

impl KeyObject {
    pub fn allows_any(&self, usages: &[KeyUsage]) -> bool {
        usages.iter().any(|u| self.usages.contains(u))
    }
}

/// In-memory object store. Object ids are never reused within a token.
#[derive(Default)]
pub(crate) struct Keystore {
    next_id: u64,
    objects: HashMap<u64, KeyObject>,
}

impl Keystore {
    pub fn insert(&mut self, object: KeyObject) -> ObjectId {
        self.next_id += 1;
        let id = self.next_id;
        self.objects.insert(id, object);
        ObjectId(id)
    }

    pub fn get(&self, id: ObjectId) -> Result<&KeyObject, TokenError> {
        self.objects.get(&id.0).ok_or(TokenError::KeyNotFound)
    }

    pub fn remove(&mut self, id: ObjectId) -> Result<(), TokenError> {
        self.objects
            .remove(&id.0)
            .map(|_| ())
            .ok_or(TokenError::KeyNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_object() -> KeyObject {
        KeyObject {
            material: KeyMaterial::Secret(Zeroizing::new(vec![0u8; 32])),
            role: KeyRole::Secret,
            extractable: true,
            usages: vec![KeyUsage::Encrypt],
        }
    }

    #[test]
    fn test_object_ids_are_not_reused() {
        let mut store = Keystore::default();
        let first = store.insert(secret_object());
        store.remove(first).unwrap();
        let second = store.insert(secret_object());
        assert_ne!(first, second);
    }

    #[test]
    fn test_missing_object_is_key_not_found() {
        let store = Keystore::default();
        assert_eq!(
            store.get(ObjectId(99)).map(|_| ()).unwrap_err(),
            TokenError::KeyNotFound
        );
    }
}
