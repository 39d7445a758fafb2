// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Partitions, Variant};

use std::fmt::Display;

/// The text marking a NULL field
const NULL: &str = "\\N";

/// How an image is named in a table
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageName {
    /// Partition values; both must be present for the image to have a name
    Owned {
        owner: Option<String>,
        name: Option<String>,
    },

    /// A full image reference column
    Reference(Option<String>),
}

impl ImageName {
    /// The `image-name` value, or `None` when any part is NULL
    pub fn value(&self) -> Option<String> {
        match self {
            Self::Owned {
                owner: Some(owner),
                name: Some(name),
            } => Some(format!("{}/{}", owner, name)),
            Self::Owned { .. } => None,
            Self::Reference(reference) => reference.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Platform {
    pub architecture: Option<String>,
    pub os: Option<String>,
    pub variant: Option<String>,
    pub os_version: Option<String>,
}

impl Platform {
    /// The `platform` value (`arch-os`), or `None` when either part is NULL
    pub fn value(&self) -> Option<String> {
        match (&self.architecture, &self.os) {
            (Some(arch), Some(os)) => Some(format!("{}-{}", arch, os)),
            _ => None,
        }
    }
}

/// One row of a layer table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerRecord {
    pub image: ImageName,
    pub tag: Option<String>,

    /// The manifest digest; only partitioned tables carry it
    pub image_digest: Option<String>,

    /// Only partitioned tables carry a platform
    pub platform: Option<Platform>,

    pub layer_digest: Option<String>,
    pub layer_size: Option<i64>,
}

impl LayerRecord {
    /// Decodes a row the way a lazy text serde does
    ///
    /// Decoding never fails. Missing trailing fields and `\N` are NULL,
    /// extra fields are ignored, and a size that is not a 64-bit integer
    /// is NULL.
    pub fn decode(variant: Variant, partitions: &Partitions, row: &[&str]) -> Self {
        let text = |i: usize| row.get(i).filter(|s| **s != NULL).map(|s| s.to_string());
        let bigint = |i: usize| row.get(i).and_then(|s| s.parse::<i64>().ok());

        match variant {
            Variant::Partitioned => Self {
                image: ImageName::Owned {
                    owner: partitions.get("owner").map(String::from),
                    name: partitions.get("name").map(String::from),
                },
                tag: text(0),
                image_digest: text(1),
                platform: Some(Platform {
                    architecture: text(2),
                    os: text(3),
                    variant: text(4),
                    os_version: text(5),
                }),
                layer_digest: text(6),
                layer_size: bigint(7),
            },

            Variant::Flat => Self {
                image: ImageName::Reference(text(0)),
                tag: text(1),
                image_digest: None,
                platform: None,
                layer_digest: text(2),
                layer_size: bigint(3),
            },
        }
    }
}

impl Display for LayerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let image = self.image.value();
        let tag = self.tag.as_deref().unwrap_or(NULL);
        let layer = self.layer_digest.as_deref().unwrap_or(NULL);
        write!(f, "{}:{} {}", image.as_deref().unwrap_or(NULL), tag, layer)
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::super::{Partitions, Variant};
    use super::{ImageName, LayerRecord};

    const DIGEST: &str = "sha256:4f4fb700ef54461cfa02571ae0db9a0dc1e0cdb5577484a6d75e68dc38e8acc1";

    #[test]
    fn partitioned() {
        let parts = Partitions::from_path(Path::new("owner=library/name=redis/0.csv"));
        let row = ["7.0", "sha256:abc", "arm64", "linux", "v8", "", DIGEST, "32"];

        let rec = LayerRecord::decode(Variant::Partitioned, &parts, &row);
        assert_eq!(rec.image.value().as_deref(), Some("library/redis"));
        assert_eq!(rec.tag.as_deref(), Some("7.0"));
        let platform = rec.platform.unwrap();
        assert_eq!(platform.value().as_deref(), Some("arm64-linux"));
        assert_eq!(platform.variant.as_deref(), Some("v8"));
        assert_eq!(platform.os_version.as_deref(), Some(""));
        assert_eq!(rec.layer_digest.as_deref(), Some(DIGEST));
        assert_eq!(rec.layer_size, Some(32));
    }

    #[test]
    fn flat() {
        let row = ["docker.io/library/alpine", "3.15", DIGEST, "2818413"];
        let rec = LayerRecord::decode(Variant::Flat, &Partitions::default(), &row);
        assert_eq!(
            rec.image,
            ImageName::Reference(Some("docker.io/library/alpine".into()))
        );
        assert_eq!(rec.platform, None);
        assert_eq!(rec.layer_size, Some(2818413));
    }

    #[test]
    fn nulls() {
        let row = ["alpine", "\\N", DIGEST];
        let rec = LayerRecord::decode(Variant::Flat, &Partitions::default(), &row);
        assert_eq!(rec.tag, None);
        assert_eq!(rec.layer_size, None);

        for size in ["", "12kb", "\\N", "99999999999999999999"] {
            let row = ["alpine", "latest", DIGEST, size, "extra"];
            let rec = LayerRecord::decode(Variant::Flat, &Partitions::default(), &row);
            assert_eq!(rec.layer_size, None, "{:?}", size);
        }
    }

    #[test]
    fn missing_partition() {
        let parts = Partitions::from_path(Path::new("owner=library/0.csv"));
        let row = ["latest"];
        let rec = LayerRecord::decode(Variant::Partitioned, &parts, &row);
        assert_eq!(rec.image.value(), None);
        assert_eq!(rec.platform.unwrap().value(), None);
    }
}
