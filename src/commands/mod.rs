// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::api::{self, TableDef};
use crate::formats::Variant;

use structopt::StructOpt;

mod queries;
mod query;
mod schema;
mod sql;

pub trait Command {
    fn execute(self) -> anyhow::Result<()>;
}

// Where the layer tables live
#[derive(StructOpt, Debug)]
pub struct Catalog {
    /// The catalog database name
    #[structopt(long, env = "LAYERSTATS_DATABASE", default_value = api::DATABASE)]
    database: String,

    /// The bucket holding the layer data
    #[structopt(long, env = "LAYERSTATS_BUCKET", default_value = api::BUCKET)]
    bucket: String,

    /// Overrides the table name of the chosen variant
    #[structopt(long, env = "LAYERSTATS_TABLE")]
    table: Option<String>,
}

impl Catalog {
    pub fn table(&self, variant: Variant) -> TableDef {
        let table = TableDef::new(variant, &self.database, &self.bucket);
        match &self.table {
            Some(name) => table.named(name),
            None => table,
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(about = "docker image layer analytics")]
pub enum Main {
    Queries(queries::Queries),
    Sql(sql::Sql),
    Schema(schema::Schema),
    Query(query::Query),
}

impl Command for Main {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Queries(cmd) => cmd.execute(),
            Self::Sql(cmd) => cmd.execute(),
            Self::Schema(cmd) => cmd.execute(),
            Self::Query(cmd) => cmd.execute(),
        }
    }
}
