// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Dimension, NullPolicy, Order, Row};
use crate::formats::LayerRecord;

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::{anyhow, Result};
use log::debug;

type Key = Vec<Option<String>>;

/// Ascending key order with NULL components last
fn nulls_last(a: &Key, b: &Key) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.is_none().cmp(&y.is_none()).then_with(|| x.cmp(y)))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Two-stage layer aggregation
///
/// Rows are first collapsed to one per grouping key and layer digest,
/// keeping the largest size seen for that digest. The collapsed layers are
/// then counted and summed per grouping key. A layer shared by several
/// tags, images or platforms is therefore counted once per key, never once
/// per row.
///
/// Slots are keyed by the output key values, so rows whose source columns
/// differ but produce the same key (including the NULL key) share a slot.
#[derive(Debug)]
pub struct Aggregator {
    dimensions: Vec<Dimension>,
    policy: NullPolicy,
    layers: HashMap<(Key, Option<String>), Option<i64>>,
    rows: u64,
}

impl Aggregator {
    pub fn new(dimensions: &[Dimension], policy: NullPolicy) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
            policy,
            layers: HashMap::new(),
            rows: 0,
        }
    }

    /// Stage one: fold a record into its (key, digest) slot
    pub fn push(&mut self, record: &LayerRecord) -> Result<()> {
        let size = match (record.layer_size, self.policy) {
            (None, NullPolicy::Reject) => {
                return Err(anyhow!("layer-size is NULL for {}", record));
            }
            (None, NullPolicy::Zero) => Some(0),
            (size, ..) => size,
        };

        let key = self.dimensions.iter().map(|d| d.value(record)).collect();
        let slot = (key, record.layer_digest.clone());

        // Option orders None below Some, so this is SQL's NULL-skipping max.
        self.layers
            .entry(slot)
            .and_modify(|have| *have = (*have).max(size))
            .or_insert(size);

        self.rows += 1;
        Ok(())
    }

    /// Number of records pushed so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Stage two: roll deduplicated layers up by key
    pub fn finish(self, order: Order) -> Result<Vec<Row>> {
        debug!(
            "{} rows collapsed into {} layers",
            self.rows,
            self.layers.len()
        );

        let mut groups: HashMap<Key, (u64, Option<i64>)> = HashMap::new();
        for ((key, ..), size) in self.layers {
            let (count, total) = groups.entry(key).or_insert((0, None));
            *count += 1;

            if let Some(size) = size {
                let sum = total.unwrap_or(0);
                let sum = sum
                    .checked_add(size)
                    .ok_or_else(|| anyhow!("bigint overflow summing layer sizes"))?;
                *total = Some(sum);
            }
        }

        // An ungrouped aggregate always yields exactly one row.
        if self.dimensions.is_empty() && groups.is_empty() {
            let total = match self.policy {
                NullPolicy::Propagate => None,
                NullPolicy::Zero | NullPolicy::Reject => Some(0),
            };

            groups.insert(Vec::new(), (0, total));
        }

        let mut rows: Vec<Row> = groups
            .into_iter()
            .map(|(key, (layers, bytes))| Row { key, layers, bytes })
            .collect();

        rows.sort_by(|a, b| nulls_last(&a.key, &b.key));
        if order == Order::SizeDescending {
            // Stable, so equal totals keep ascending key order.
            rows.sort_by(|a, b| b.bytes.cmp(&a.bytes));
        }

        Ok(rows)
    }
}
