// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Renders grouping dimensions as the equivalent serverless SQL

use super::{Dimension, Order, TOTAL_LAYERS, TOTAL_SIZE};
use crate::formats::Variant;

/// Double-quotes an identifier
pub fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl Dimension {
    /// The inner select expression producing this key
    fn select(self, variant: Variant) -> String {
        match (self, variant) {
            (Self::Image, Variant::Partitioned) => {
                format!("concat(\"owner\", '/', \"name\") AS {}", quote(self.alias()))
            }
            (Self::Image, Variant::Flat) => quote(self.alias()),
            (Self::Platform, ..) => format!(
                "concat(\"platform-arch\", '-', \"platform-os\") AS {}",
                quote(self.alias())
            ),
        }
    }

    /// The source columns the inner query groups by
    fn columns(self, variant: Variant) -> &'static [&'static str] {
        match (self, variant) {
            (Self::Image, Variant::Partitioned) => &["owner", "name"],
            (Self::Image, Variant::Flat) => &["image-name"],
            (Self::Platform, ..) => &["platform-arch", "platform-os"],
        }
    }
}

/// Builds the deduplicate-then-aggregate statement for a grouping
pub fn render(
    variant: Variant,
    dimensions: &[Dimension],
    order: Order,
    database: &str,
    table: &str,
) -> String {
    let outer: Vec<String> = dimensions.iter().map(|d| quote(d.alias())).collect();

    let mut inner: Vec<String> = dimensions.iter().map(|d| d.select(variant)).collect();
    inner.push(quote("layer-digest"));
    inner.push(format!("max({}) AS {}", quote("layer-size"), quote("layer-size")));

    let mut grouped: Vec<String> = dimensions
        .iter()
        .flat_map(|d| d.columns(variant).iter().map(|c| quote(c)))
        .collect();
    grouped.push(quote("layer-digest"));

    let mut select = outer.clone();
    select.push(format!("count(*) AS {}", quote(TOTAL_LAYERS)));
    select.push(format!("sum({}) AS {}", quote("layer-size"), quote(TOTAL_SIZE)));

    let mut sql = format!(
        "SELECT {}\nFROM (\n    SELECT {}\n    FROM {}.{}\n    GROUP BY {}\n)",
        select.join(", "),
        inner.join(", "),
        quote(database),
        quote(table),
        grouped.join(", "),
    );

    if !outer.is_empty() {
        sql.push_str(&format!("\nGROUP BY {}", outer.join(", ")));
    }

    if order == Order::SizeDescending {
        sql.push_str(&format!("\nORDER BY {} DESC", quote(TOTAL_SIZE)));
    }

    sql
}

#[cfg(test)]
mod test {
    use super::{quote, render};
    use crate::formats::Variant;
    use crate::query::{Dimension, Order};

    #[test]
    fn per_platform() {
        let sql = render(
            Variant::Partitioned,
            &[Dimension::Platform],
            Order::SizeDescending,
            "docker_image_db",
            "layers",
        );

        assert_eq!(
            sql,
            "SELECT \"platform\", count(*) AS \"total-layers\", sum(\"layer-size\") AS \"total-layers-size(bytes)\"\n\
             FROM (\n    \
             SELECT concat(\"platform-arch\", '-', \"platform-os\") AS \"platform\", \"layer-digest\", max(\"layer-size\") AS \"layer-size\"\n    \
             FROM \"docker_image_db\".\"layers\"\n    \
             GROUP BY \"platform-arch\", \"platform-os\", \"layer-digest\"\n\
             )\n\
             GROUP BY \"platform\"\n\
             ORDER BY \"total-layers-size(bytes)\" DESC"
        );
    }

    #[test]
    fn per_image_and_platform() {
        let sql = render(
            Variant::Partitioned,
            &[Dimension::Image, Dimension::Platform],
            Order::Key,
            "db",
            "layers",
        );

        assert!(sql.starts_with("SELECT \"image-name\", \"platform\", count(*)"));
        assert!(sql.contains("concat(\"owner\", '/', \"name\") AS \"image-name\""));
        assert!(sql.contains(
            "GROUP BY \"owner\", \"name\", \"platform-arch\", \"platform-os\", \"layer-digest\""
        ));
        assert!(sql.ends_with("GROUP BY \"image-name\", \"platform\""));
    }

    #[test]
    fn global() {
        let sql = render(Variant::Flat, &[], Order::Key, "db", "layers_csv");
        assert!(sql.starts_with("SELECT count(*) AS \"total-layers\""));
        assert!(sql.contains("GROUP BY \"layer-digest\"\n)"));
        assert!(sql.ends_with(")"));
    }

    #[test]
    fn quoting() {
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }
}
