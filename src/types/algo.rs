// Copyright (C) Microsoft Corporation. All rights reserved.

/// Caller-supplied request for a specific algorithm and its parameters.
///
/// The `name` field is matched case-insensitively against a family's
/// canonical name during validation. Validation never mutates the caller's
/// descriptor; it produces a canonicalized copy for internal use.
///
/// Parameter fields are optional because each algorithm family consumes a
/// different subset: AES-CBC requires `iv`, RSA-PSS consumes `hash` and
/// `salt_length`, key generation consumes `length` or `modulus_length`.
/// Families reject descriptors missing their required parameters during the
/// per-call check phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmDescriptor {
    /// Algorithm name, case-insensitive on input.
    pub name: String,

    /// Nested hash descriptor, required by hash-dependent families.
    pub hash: Option<Box<AlgorithmDescriptor>>,

    /// Initialization vector for block cipher modes.
    pub iv: Option<Vec<u8>>,

    /// PSS salt length in bytes; defaults to the digest length when absent.
    pub salt_length: Option<usize>,

    /// Symmetric key length in bits, for key generation.
    pub length: Option<usize>,

    /// RSA modulus length in bits, for key-pair generation.
    pub modulus_length: Option<usize>,
}

impl AlgorithmDescriptor {
    /// Create a descriptor carrying only a name.
    pub fn new(name: impl Into<String>) -> Self {
        AlgorithmDescriptor {
            name: name.into(),
            hash: None,
            iv: None,
            salt_length: None,
            length: None,
            modulus_length: None,
        }
    }

    /// Attach a nested hash descriptor.
    pub fn with_hash(mut self, hash: AlgorithmDescriptor) -> Self {
        self.hash = Some(Box::new(hash));
        self
    }

    /// Attach an initialization vector.
    pub fn with_iv(mut self, iv: impl Into<Vec<u8>>) -> Self {
        self.iv = Some(iv.into());
        self
    }

    /// Attach a PSS salt length in bytes.
    pub fn with_salt_length(mut self, salt_length: usize) -> Self {
        self.salt_length = Some(salt_length);
        self
    }

    /// Attach a symmetric key length in bits.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Attach an RSA modulus length in bits.
    pub fn with_modulus_length(mut self, modulus_length: usize) -> Self {
        self.modulus_length = Some(modulus_length);
        self
    }

    /// Copy of this descriptor with its name replaced by the canonical
    /// spelling. Nested parameters are preserved unchanged.
    pub(crate) fn canonicalized(&self, canonical_name: &str) -> Self {
        let mut alg = self.clone();
        alg.name = canonical_name.to_owned();
        alg
    }
}
