// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Table layouts and CSV row decoding

mod partition;
mod record;

pub use self::partition::Partitions;
pub use self::record::{ImageName, LayerRecord, Platform};

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Bigint,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Bigint => f.write_str("bigint"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,

    #[serde(rename = "type")]
    pub kind: ColumnType,
}

impl Column {
    const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnType::String,
        }
    }

    const fn bigint(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnType::Bigint,
        }
    }
}

/// The two shapes a layer table can take
///
/// `Partitioned` tables take `owner` and `name` from the directory layout
/// (`owner=<owner>/name=<name>/`) and hold eight data columns per row.
/// `Flat` tables hold four columns and no partitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    Partitioned,
    Flat,
}

impl Variant {
    const PARTITION_KEYS: &'static [Column] = &[Column::string("owner"), Column::string("name")];

    const PARTITIONED: &'static [Column] = &[
        Column::string("image-tag"),
        Column::string("image-digest"),
        Column::string("platform-arch"),
        Column::string("platform-os"),
        Column::string("platform-variant"),
        Column::string("platform-os-version"),
        Column::string("layer-digest"),
        Column::bigint("layer-size"),
    ];

    const FLAT: &'static [Column] = &[
        Column::string("image-name"),
        Column::string("image-tag"),
        Column::string("layer-digest"),
        Column::bigint("layer-size"),
    ];

    /// Columns whose values come from the object path rather than the file
    pub fn partition_keys(self) -> &'static [Column] {
        match self {
            Self::Partitioned => Self::PARTITION_KEYS,
            Self::Flat => &[],
        }
    }

    /// Data columns, in file order
    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::Partitioned => Self::PARTITIONED,
            Self::Flat => Self::FLAT,
        }
    }

    /// The default catalog table name
    pub fn table(self) -> &'static str {
        match self {
            Self::Partitioned => "layers",
            Self::Flat => "layers_csv",
        }
    }

    /// The object key prefix the data is uploaded under
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Partitioned => "docker-image-layers",
            Self::Flat => "docker-images-layers",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Partitioned => "Docker image layers with partition owner and name",
            Self::Flat => "Docker image layers",
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Partitioned => f.write_str("partitioned"),
            Self::Flat => f.write_str("flat"),
        }
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "partitioned" => Ok(Self::Partitioned),
            "flat" => Ok(Self::Flat),
            _ => Err(anyhow!("unknown table variant: {}", s)),
        }
    }
}
