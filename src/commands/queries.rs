// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::Command;
use crate::api::QUERIES;

use structopt::StructOpt;

/// List the named query templates
#[derive(StructOpt, Debug)]
pub struct Queries {}

impl Command for Queries {
    fn execute(self) -> anyhow::Result<()> {
        let width = QUERIES.iter().map(|q| q.name.len()).max().unwrap_or_default();

        for q in QUERIES {
            println!(
                "{:<width$}  {:<14}  {:<11}  {}",
                q.name,
                q.alias,
                q.variant.to_string(),
                q.description,
                width = width
            );
        }

        Ok(())
    }
}
