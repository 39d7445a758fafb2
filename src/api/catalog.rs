// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::Corpus;
use crate::formats::Variant;
use crate::query::{sql, Aggregator, Dimension, NullPolicy, Order, Report};

use anyhow::{anyhow, Result};
use log::info;

/// A stored, parameterless aggregate over a layer table
#[derive(Debug, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: &'static str,
    pub alias: &'static str,
    pub description: &'static str,
    pub variant: Variant,
    pub dimensions: &'static [Dimension],
    pub order: Order,
}

pub const QUERIES: &[NamedQuery] = &[
    NamedQuery {
        name: "Docker_Layers_Stats_Per_Image_And_Platform",
        alias: "image-platform",
        description: "Template of stats layers count and size per image and platform",
        variant: Variant::Partitioned,
        dimensions: &[Dimension::Image, Dimension::Platform],
        order: Order::Key,
    },
    NamedQuery {
        name: "Docker_Layers_Stats_Per_Platform",
        alias: "platform",
        description: "Template of stats total layers and size per arch and os",
        variant: Variant::Partitioned,
        dimensions: &[Dimension::Platform],
        order: Order::SizeDescending,
    },
    NamedQuery {
        name: "Docker_Layers_Stats_Per_Image",
        alias: "image",
        description: "Template of stats layers count and size per image",
        variant: Variant::Flat,
        dimensions: &[Dimension::Image],
        order: Order::Key,
    },
    NamedQuery {
        name: "Docker_Layers_Stats_Global",
        alias: "global",
        description: "Template of stats total layers and size across all images",
        variant: Variant::Flat,
        dimensions: &[],
        order: Order::Key,
    },
];

impl NamedQuery {
    /// Looks a query up by name or alias, ignoring case
    pub fn find(name: &str) -> Result<&'static Self> {
        QUERIES
            .iter()
            .find(|q| q.name.eq_ignore_ascii_case(name) || q.alias.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("unknown query: {}", name))
    }

    /// The query text against `"database"."table"`
    pub fn sql(&self, database: &str, table: &str) -> String {
        sql::render(self.variant, self.dimensions, self.order, database, table)
    }

    /// Evaluates the query over a local copy of the table data
    pub fn run(&self, corpus: &Corpus, policy: NullPolicy) -> Result<Report> {
        if corpus.variant() != self.variant {
            return Err(anyhow!(
                "{} reads {} tables, not {}",
                self.name,
                self.variant,
                corpus.variant()
            ));
        }

        let mut agg = Aggregator::new(self.dimensions, policy);
        let files = corpus.scan(|record| agg.push(record))?;
        info!("{}: {} rows from {} files", self.name, agg.rows(), files);

        let rows = agg.finish(self.order)?;
        Ok(Report::new(self.dimensions, rows))
    }
}
