// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

/// A reader over plain or gzip-compressed text
///
/// Compression is chosen by file extension, the way object-store query
/// engines pick a codec: `.gz` files are decompressed, anything else is
/// read as is.
#[derive(Debug)]
pub enum Decoded<R: Read> {
    Plain(R),
    Gzip(MultiGzDecoder<R>),
}

impl<R: Read> Decoded<R> {
    pub fn new(reader: R, compressed: bool) -> Self {
        if compressed {
            Self::Gzip(MultiGzDecoder::new(reader))
        } else {
            Self::Plain(reader)
        }
    }
}

impl Decoded<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let compressed = path.extension().map_or(false, |ext| ext == "gz");
        Ok(Self::new(BufReader::new(file), compressed))
    }
}

impl<R: Read> Read for Decoded<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(x) => x.read(buf),
            Self::Gzip(x) => x.read(buf),
        }
    }
}
