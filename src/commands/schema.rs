// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Catalog, Command};
use crate::formats::Variant;

use structopt::StructOpt;

/// Print the table definition of a variant
#[derive(StructOpt, Debug)]
pub struct Schema {
    #[structopt(flatten)]
    catalog: Catalog,

    /// Number of header lines in each data file
    #[structopt(long, default_value = "0")]
    skip_header: usize,

    /// Print the definition as JSON instead of DDL
    #[structopt(long)]
    json: bool,

    /// The table variant (partitioned or flat)
    #[structopt(possible_values = &["partitioned", "flat"], case_insensitive = true)]
    variant: Variant,
}

impl Command for Schema {
    fn execute(self) -> anyhow::Result<()> {
        let table = self
            .catalog
            .table(self.variant)
            .skip_header(self.skip_header);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&table)?);
        } else {
            println!("{}", table);
        }

        Ok(())
    }
}
