// Copyright (C) Microsoft Corporation. All rights reserved.

//! Shared data model: algorithm descriptors, key handles, interchange records.

mod algo;
mod format;
mod key;

pub use algo::*;
pub use format::*;
pub use key::*;
