// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::path::{Component, Path};

use regex::Regex;

/// Partition values taken from `key=value` path segments
///
/// Values are stored unescaped: `%2F` in a segment becomes `/`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partitions(Vec<(String, String)>);

impl Partitions {
    const RE: &'static str = "^([^=]+)=(.*)$";

    pub fn from_path(path: &Path) -> Self {
        let re = Regex::new(Self::RE).unwrap();
        let mut out = Vec::new();

        for component in path.components() {
            if let Component::Normal(segment) = component {
                let segment = segment.to_string_lossy();
                if let Some(caps) = re.captures(&segment) {
                    out.push((unescape(&caps[1]), unescape(&caps[2])));
                }
            }
        }

        Self(out)
    }

    /// The value of a key; the deepest segment wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, ..)| k == key)
            .map(|(.., v)| v.as_str())
    }
}

fn unescape(segment: &str) -> String {
    fn hex(byte: u8) -> Option<u8> {
        Some(match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return None,
        })
    }

    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }

        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::{unescape, Partitions};

    #[test]
    fn segments() {
        let path = Path::new("/data/docker-image-layers/owner=library/name=redis/part-0.csv");
        let parts = Partitions::from_path(path);
        assert_eq!(parts.get("owner"), Some("library"));
        assert_eq!(parts.get("name"), Some("redis"));
        assert_eq!(parts.get("tag"), None);
    }

    #[test]
    fn deepest() {
        let parts = Partitions::from_path(Path::new("owner=a/owner=b/x.csv"));
        assert_eq!(parts.get("owner"), Some("b"));
    }

    #[test]
    fn none() {
        let parts = Partitions::from_path(Path::new("/data/layers.csv"));
        assert_eq!(parts, Partitions::default());
    }

    #[test]
    fn escapes() {
        assert_eq!(unescape("bitnami%2Fredis"), "bitnami/redis");
        assert_eq!(unescape("50%"), "50%");
        assert_eq!(unescape("%zz"), "%zz");
        assert_eq!(unescape("a%3d"), "a=");
    }
}
