// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Utility types for dealing with readers

mod decoded;

pub use decoded::Decoded;
