// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::formats::{Column, Variant};

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

/// An external catalog table over delimited text in object storage
#[derive(Clone, Debug, Serialize)]
pub struct TableDef {
    pub database: String,
    pub name: String,
    pub description: String,

    #[serde(rename = "tableType")]
    pub table_type: &'static str,

    pub parameters: BTreeMap<&'static str, String>,

    #[serde(rename = "partitionKeys")]
    pub partition_keys: &'static [Column],

    pub columns: &'static [Column],

    pub location: String,

    #[serde(rename = "inputFormat")]
    pub input_format: &'static str,

    #[serde(rename = "outputFormat")]
    pub output_format: &'static str,

    #[serde(rename = "serializationLibrary")]
    pub serialization_library: &'static str,

    #[serde(rename = "serdeParameters")]
    pub serde_parameters: BTreeMap<&'static str, String>,

    #[serde(skip)]
    pub variant: Variant,
}

impl TableDef {
    const EXTERNAL: &'static str = "EXTERNAL_TABLE";
    const INPUT: &'static str = "org.apache.hadoop.mapred.TextInputFormat";
    const OUTPUT: &'static str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";
    const SERDE: &'static str = "org.apache.hadoop.hive.serde2.lazy.LazySimpleSerDe";

    pub const DELIMITER: u8 = b',';

    pub fn new(variant: Variant, database: &str, bucket: &str) -> Self {
        let delim = char::from(Self::DELIMITER).to_string();

        let mut parameters = BTreeMap::new();
        parameters.insert("skip.header.line.count", "0".into());

        let mut serde_parameters = BTreeMap::new();
        serde_parameters.insert("field.delim", delim.clone());
        serde_parameters.insert("serialization.format", delim);

        Self {
            database: database.into(),
            name: variant.table().into(),
            description: variant.description().into(),
            table_type: Self::EXTERNAL,
            parameters,
            partition_keys: variant.partition_keys(),
            columns: variant.columns(),
            location: format!("s3://{}/{}/", bucket, variant.prefix()),
            input_format: Self::INPUT,
            output_format: Self::OUTPUT,
            serialization_library: Self::SERDE,
            serde_parameters,
            variant,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.into();
        self
    }

    pub fn skip_header(mut self, lines: usize) -> Self {
        self.parameters
            .insert("skip.header.line.count", lines.to_string());
        self
    }

    /// Lines skipped at the start of every data file
    pub fn header_lines(&self) -> usize {
        self.parameters
            .get("skip.header.line.count")
            .and_then(|n| n.parse().ok())
            .unwrap_or_default()
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn columns(f: &mut std::fmt::Formatter<'_>, columns: &[Column]) -> std::fmt::Result {
    for (i, column) in columns.iter().enumerate() {
        let sep = if i + 1 < columns.len() { "," } else { "" };
        writeln!(f, "  `{}` {}{}", column.name, column.kind, sep)?;
    }

    Ok(())
}

fn properties<'a>(
    f: &mut std::fmt::Formatter<'_>,
    props: impl IntoIterator<Item = (&'a &'static str, &'a String)>,
) -> std::fmt::Result {
    let props: Vec<String> = props
        .into_iter()
        .map(|(k, v)| format!("  '{}'='{}'", escape(k), escape(v)))
        .collect();
    writeln!(f, "{})", props.join(",\n"))
}

/// Hive DDL for the table
impl Display for TableDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "CREATE EXTERNAL TABLE `{}`.`{}` (", self.database, self.name)?;
        columns(f, self.columns)?;
        writeln!(f, ")")?;
        writeln!(f, "COMMENT '{}'", escape(&self.description))?;

        if !self.partition_keys.is_empty() {
            writeln!(f, "PARTITIONED BY (")?;
            columns(f, self.partition_keys)?;
            writeln!(f, ")")?;
        }

        writeln!(f, "ROW FORMAT SERDE")?;
        writeln!(f, "  '{}'", self.serialization_library)?;
        writeln!(f, "WITH SERDEPROPERTIES (")?;
        properties(f, &self.serde_parameters)?;
        writeln!(f, "STORED AS INPUTFORMAT")?;
        writeln!(f, "  '{}'", self.input_format)?;
        writeln!(f, "OUTPUTFORMAT")?;
        writeln!(f, "  '{}'", self.output_format)?;
        writeln!(f, "LOCATION")?;
        writeln!(f, "  '{}'", escape(&self.location))?;
        writeln!(f, "TBLPROPERTIES (")?;
        properties(f, &self.parameters)?;
        write!(f, ";")
    }
}
