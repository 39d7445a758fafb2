// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Catalog, Command};
use crate::api::NamedQuery;

use structopt::StructOpt;

/// Print the SQL text of a named query
#[derive(StructOpt, Debug)]
pub struct Sql {
    #[structopt(flatten)]
    catalog: Catalog,

    /// The query name or alias
    query: String,
}

impl Command for Sql {
    fn execute(self) -> anyhow::Result<()> {
        let query = NamedQuery::find(&self.query)?;
        let table = self.catalog.table(query.variant);
        println!("{}", query.sql(&table.database, &table.name));
        Ok(())
    }
}
