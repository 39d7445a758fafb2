// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Deduplicating layer aggregation and its SQL form

mod aggregate;
mod render;
pub mod sql;

pub use self::aggregate::Aggregator;
pub use self::render::{Format, Report};

use crate::formats::{LayerRecord, Variant};

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, Error};

/// Output alias of the layer count
pub const TOTAL_LAYERS: &str = "total-layers";

/// Output alias of the summed layer size
pub const TOTAL_SIZE: &str = "total-layers-size(bytes)";

/// A grouping key component
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dimension {
    /// `owner/name` for partitioned tables, `image-name` for flat ones
    Image,

    /// `platform-arch` and `platform-os` joined by `-`
    Platform,
}

impl Dimension {
    /// The output column alias
    pub fn alias(self) -> &'static str {
        match self {
            Self::Image => "image-name",
            Self::Platform => "platform",
        }
    }

    /// The key value of a record; `None` is the NULL group
    pub fn value(self, record: &LayerRecord) -> Option<String> {
        match self {
            Self::Image => record.image.value(),
            Self::Platform => record.platform.as_ref().and_then(|p| p.value()),
        }
    }

    /// Whether a table variant has the columns this dimension needs
    pub fn supports(self, variant: Variant) -> bool {
        match self {
            Self::Image => true,
            Self::Platform => variant == Variant::Partitioned,
        }
    }
}

/// Result row ordering
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    /// Ascending by grouping key
    Key,

    /// Descending by total size, NULL totals last, ties by key
    SizeDescending,
}

/// What to do with a NULL `layer-size`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NullPolicy {
    /// SQL aggregate semantics: NULLs are skipped by `max` and `sum`
    Propagate,

    /// NULL sizes count as zero bytes
    Zero,

    /// A NULL size fails the query
    Reject,
}

impl Default for NullPolicy {
    fn default() -> Self {
        Self::Propagate
    }
}

impl Display for NullPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Propagate => f.write_str("propagate"),
            Self::Zero => f.write_str("zero"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for NullPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "propagate" => Ok(Self::Propagate),
            "zero" => Ok(Self::Zero),
            "reject" => Ok(Self::Reject),
            _ => Err(anyhow!("unknown null size policy: {}", s)),
        }
    }
}

/// One aggregated output row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    /// One value per grouping dimension
    pub key: Vec<Option<String>>,
    pub layers: u64,
    pub bytes: Option<i64>,
}
