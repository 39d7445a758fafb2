// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::TableDef;
use crate::formats::{LayerRecord, Partitions, Variant};
use crate::iotools::Decoded;

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A local copy of a table's data files
///
/// The root is either a single file or a directory laid out like the
/// bucket prefix. Partitioned tables expect `owner=<owner>/name=<name>/`
/// directories above every data file.
#[derive(Clone, Debug)]
pub struct Corpus {
    root: PathBuf,
    variant: Variant,
    skip: usize,
    progress: bool,
}

fn hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map_or(false, |s| s.starts_with('.') || s.starts_with('_'))
}

impl Corpus {
    pub fn new(root: impl Into<PathBuf>, table: &TableDef) -> Self {
        Self {
            root: root.into(),
            variant: table.variant,
            skip: table.header_lines(),
            progress: false,
        }
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Data files in path order, skipping hidden files and directories
    ///
    /// Symbolic links are followed.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !hidden(e))
        {
            let entry = entry.with_context(|| format!("walking {}", self.root.display()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        if files.is_empty() {
            warn!("no data files under {}", self.root.display());
        }

        Ok(files)
    }

    fn partitions(&self, path: &Path) -> Result<Partitions> {
        let partitions = Partitions::from_path(path);

        for key in self.variant.partition_keys() {
            if partitions.get(key.name).is_none() {
                return Err(anyhow!(
                    "{}: no `{}=` partition in path",
                    path.display(),
                    key.name
                ));
            }
        }

        Ok(partitions)
    }

    fn read<F>(&self, path: &Path, f: &mut F) -> Result<()>
    where
        F: FnMut(&LayerRecord) -> Result<()>,
    {
        let partitions = self.partitions(path)?;
        let reader = BufReader::new(Decoded::open(path)?);
        let delim = char::from(TableDef::DELIMITER);

        // Every physical line is a row: no quoting, and a blank line is a
        // row of one empty field. Bad UTF-8 is replaced, not fatal.
        let mut lines = 0usize;
        for line in reader.split(b'\n') {
            let mut line = line.with_context(|| format!("reading {}", path.display()))?;
            lines += 1;
            if lines <= self.skip {
                continue;
            }

            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let text = String::from_utf8_lossy(&line);
            let fields: Vec<&str> = text.split(delim).collect();
            let record = LayerRecord::decode(self.variant, &partitions, &fields);
            f(&record).with_context(|| format!("{}:{}", path.display(), lines))?;
        }

        debug!("{}: {} lines", path.display(), lines);
        Ok(())
    }

    /// Feeds every record to `f`, returning the number of files read
    pub fn scan<F>(&self, mut f: F) -> Result<usize>
    where
        F: FnMut(&LayerRecord) -> Result<()>,
    {
        let files = self.files()?;

        let pb = if self.progress {
            let tmpl = "{prefix} {elapsed:>4} {wide_bar} {pos:>6}/{len:6} {wide_msg}";
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_prefix(self.variant.table());
            pb.set_style(ProgressStyle::default_bar().template(tmpl));
            pb
        } else {
            ProgressBar::hidden()
        };

        for path in &files {
            pb.set_message(path.display().to_string());
            self.read(path, &mut f)?;
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(files.len())
    }
}

#[cfg(test)]
mod test {
    use std::fs::{create_dir_all, write, File};
    use std::io::Write;
    use std::path::Path;

    use flate2::{write::GzEncoder, Compression};
    use tempfile::TempDir;

    use super::Corpus;
    use crate::api::TableDef;
    use crate::formats::{LayerRecord, Variant};

    fn table(variant: Variant) -> TableDef {
        TableDef::new(variant, "db", "bucket")
    }

    fn collect(corpus: &Corpus) -> Vec<LayerRecord> {
        let mut out = Vec::new();
        corpus
            .scan(|r| {
                out.push(r.clone());
                Ok(())
            })
            .unwrap();
        out
    }

    fn put(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        create_dir_all(path.parent().unwrap()).unwrap();
        write(path, body).unwrap();
    }

    #[test]
    fn partitioned() {
        let dir = TempDir::new().unwrap();
        put(
            dir.path(),
            "owner=library/name=redis/0.csv",
            "7,sha256:m,amd64,linux,,,sha256:l1,100\n7,sha256:m,amd64,linux,,,sha256:l2,50\n",
        );
        put(
            dir.path(),
            "owner=bitnami/name=nginx/0.csv",
            "1.21,sha256:n,arm64,linux,v8,,sha256:l3,7\n",
        );
        put(dir.path(), "owner=bitnami/name=nginx/_SUCCESS", "");
        put(dir.path(), ".hidden/owner=x/name=y/0.csv", "garbage\n");

        let corpus = Corpus::new(dir.path(), &table(Variant::Partitioned));
        let recs = collect(&corpus);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].image.value().as_deref(), Some("bitnami/nginx"));
        assert_eq!(recs[1].image.value().as_deref(), Some("library/redis"));
        assert_eq!(recs[2].layer_size, Some(50));
    }

    #[test]
    fn missing_partition() {
        let dir = TempDir::new().unwrap();
        put(dir.path(), "owner=library/0.csv", "7,sha256:m,amd64,linux,,,sha256:l1,100\n");

        let corpus = Corpus::new(dir.path(), &table(Variant::Partitioned));
        let err = corpus.scan(|_| Ok(())).unwrap_err();
        assert!(err.to_string().contains("`name=`"));
    }

    #[test]
    fn gzip_and_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layers.csv.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"image-name,image-tag,layer-digest,layer-size\nalpine,3.15,sha256:a,\"5\"\n")
            .unwrap();
        enc.finish().unwrap();

        let corpus = Corpus::new(&path, &table(Variant::Flat).skip_header(1));
        let recs = collect(&corpus);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].tag.as_deref(), Some("3.15"));

        // Quotes are data, so the size does not parse.
        assert_eq!(recs[0].layer_size, None);
    }

    #[test]
    fn callback_error() {
        let dir = TempDir::new().unwrap();
        put(dir.path(), "a.csv", "alpine,1,sha256:a,1\nalpine,2,sha256:b,2\n");

        let corpus = Corpus::new(dir.path(), &table(Variant::Flat));
        let err = corpus
            .scan(|r| match r.layer_size {
                Some(2) => Err(anyhow::anyhow!("boom")),
                _ => Ok(()),
            })
            .unwrap_err();
        assert!(err.to_string().ends_with("a.csv:2"));
    }

    #[test]
    fn empty() {
        let dir = TempDir::new().unwrap();
        let corpus = Corpus::new(dir.path(), &table(Variant::Flat));
        assert_eq!(corpus.scan(|_| Ok(())).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks() {
        let data = TempDir::new().unwrap();
        put(data.path(), "real.csv", "imgA,t,d1,100\n");

        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(data.path().join("real.csv"), dir.path().join("l.csv")).unwrap();
        std::os::unix::fs::symlink(data.path(), dir.path().join("linked")).unwrap();

        let corpus = Corpus::new(dir.path(), &table(Variant::Flat));
        let recs = collect(&corpus);
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.layer_size == Some(100)));
    }

    #[test]
    fn blank_lines() {
        let dir = TempDir::new().unwrap();
        put(
            dir.path(),
            "a.csv",
            "image-name,image-tag,layer-digest,layer-size\n\nimgA,t,d1,100\n\nimgA,t,d2,50\r\n",
        );

        let corpus = Corpus::new(dir.path(), &table(Variant::Flat).skip_header(2));
        let recs = collect(&corpus);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].layer_digest.as_deref(), Some("d1"));
        assert_eq!(recs[1].image.value().as_deref(), Some(""));
        assert_eq!(recs[1].tag, None);
        assert_eq!(recs[1].layer_digest, None);
        assert_eq!(recs[1].layer_size, None);
        assert_eq!(recs[2].layer_size, Some(50));
    }

    #[test]
    fn invalid_utf8() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("a.csv"), b"img\xff,t,d1,7\nimgB,t,d2,8\n").unwrap();

        let corpus = Corpus::new(dir.path(), &table(Variant::Flat));
        let recs = collect(&corpus);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].image.value().as_deref(), Some("img\u{fffd}"));
        assert_eq!(recs[0].layer_size, Some(7));
    }
}
