// Copyright (C) Microsoft Corporation. All rights reserved.

//! Concrete algorithm families.
//!
//! Each family implements the [`AlgorithmFamily`](crate::AlgorithmFamily)
//! contract for one cipher or signature family: it declares its canonical
//! name and capability set, supplies the mechanism translation, and tightens
//! the per-call checks where the family has extra requirements.

mod aes;
mod rsa;

#[cfg(test)]
mod tests;

pub use aes::AesCbc;
pub use rsa::RsaPss;
