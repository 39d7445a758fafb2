// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

mod catalog;
mod corpus;
mod table;

pub use self::catalog::{NamedQuery, QUERIES};
pub use self::corpus::Corpus;
pub use self::table::TableDef;

/// The catalog database holding the layer tables
pub const DATABASE: &str = "docker_image_db";

/// The bucket the layer data is uploaded to
pub const BUCKET: &str = "docker-image-layers-analytics";
