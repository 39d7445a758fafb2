// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Dimension, Row, TOTAL_LAYERS, TOTAL_SIZE};

use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;

use anyhow::{anyhow, Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    Table,
    Csv,
    Json,
}

impl Default for Format {
    fn default() -> Self {
        Self::Table
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow!("unknown output format: {}", s)),
        }
    }
}

/// A query result with its column aliases
#[derive(Clone, Debug)]
pub struct Report {
    headers: Vec<&'static str>,
    rows: Vec<Row>,
}

struct Labeled<'a>(&'a [&'static str], &'a Row);

impl Serialize for Labeled<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Labeled(headers, row) = self;
        let mut map = serializer.serialize_map(Some(headers.len()))?;
        for (header, value) in headers.iter().zip(row.key.iter()) {
            map.serialize_entry(header, value)?;
        }
        map.serialize_entry(TOTAL_LAYERS, &row.layers)?;
        map.serialize_entry(TOTAL_SIZE, &row.bytes)?;
        map.end()
    }
}

impl Report {
    pub fn new(dimensions: &[Dimension], rows: Vec<Row>) -> Self {
        let mut headers: Vec<_> = dimensions.iter().map(|d| d.alias()).collect();
        headers.push(TOTAL_LAYERS);
        headers.push(TOTAL_SIZE);
        Self { headers, rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn cells(row: &Row) -> Vec<String> {
        let mut cells: Vec<String> = row
            .key
            .iter()
            .map(|k| k.clone().unwrap_or_default())
            .collect();
        cells.push(row.layers.to_string());
        cells.push(row.bytes.map(|b| b.to_string()).unwrap_or_default());
        cells
    }

    pub fn write<W: Write>(&self, format: Format, out: W) -> Result<()> {
        match format {
            Format::Table => self.table(out),
            Format::Csv => self.csv(out),
            Format::Json => self.json(out),
        }
    }

    fn table<W: Write>(&self, mut out: W) -> Result<()> {
        let cells: Vec<Vec<String>> = self.rows.iter().map(Self::cells).collect();
        let numeric = self.headers.len() - 2;

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<w$}", h, w = w))
            .collect();
        writeln!(out, "{}", header.join("  ").trim_end())?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(out, "{}", rule.join("  "))?;

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    if i >= numeric {
                        format!("{:>w$}", cell, w = w)
                    } else {
                        format!("{:<w$}", cell, w = w)
                    }
                })
                .collect();
            writeln!(out, "{}", line.join("  ").trim_end())?;
        }

        Ok(())
    }

    fn csv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(Self::cells(row))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn json<W: Write>(&self, mut out: W) -> Result<()> {
        let labeled: Vec<_> = self.rows.iter().map(|r| Labeled(&self.headers, r)).collect();
        serde_json::to_writer_pretty(&mut out, &labeled)?;
        writeln!(out)?;
        Ok(())
    }
}
