// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Catalog, Command};
use crate::api::{Corpus, NamedQuery};
use crate::query::{Format, NullPolicy};

use std::io::{stdout, Write};
use std::path::PathBuf;

use anyhow::Result;
use log::info;
use structopt::StructOpt;

/// Run a named query over local layer data
#[derive(StructOpt, Debug)]
pub struct Query {
    #[structopt(flatten)]
    catalog: Catalog,

    /// The output format
    #[structopt(short, long, default_value = "table", possible_values = &["table", "csv", "json"])]
    format: Format,

    /// How NULL layer sizes are aggregated
    #[structopt(long, default_value = "propagate", possible_values = &["propagate", "zero", "reject"])]
    null_sizes: NullPolicy,

    /// Number of header lines in each data file
    #[structopt(long, default_value = "0")]
    skip_header: usize,

    /// Don't display the progress bar
    #[structopt(short, long)]
    quiet: bool,

    /// The query name or alias
    query: String,

    /// A data file, or a directory laid out like the bucket prefix
    path: PathBuf,
}

impl Query {
    fn run<W: Write>(self, out: W) -> Result<()> {
        let query = NamedQuery::find(&self.query)?;
        let table = self
            .catalog
            .table(query.variant)
            .skip_header(self.skip_header);

        info!("running {} over {}", query.name, self.path.display());
        let corpus = Corpus::new(self.path, &table).progress(!self.quiet);
        let report = query.run(&corpus, self.null_sizes)?;

        report.write(self.format, out)
    }
}

impl Command for Query {
    fn execute(self) -> Result<()> {
        let out = stdout();
        self.run(out.lock())
    }
}
