//! Embedded schema script
//!
//! The schema lives in a single SQL file that is compiled into the binary and
//! applied through sqlx's migrator on startup.
//!
//! Versions inside the file are marked by a line comment like this:
//! ```sql
//! --##1 initial schema
//! ```
//! The comment specifies the version (1) and description (initial schema).
//! Comments before the first marker are ignored.
use std::{borrow::Cow, future::Future, pin::Pin};

use sqlx::{
    error::BoxDynError,
    migrate::{Migration, MigrationSource, MigrationType},
};

const VERSION_MARKER: &str = "--##";

#[derive(Debug)]
pub struct SchemaScript<'s> {
    data: &'s str,
}

impl<'s> SchemaScript<'s> {
    fn parse(&self) -> Result<Vec<Migration>, BoxDynError> {
        let mut versions = Vec::<(i64, String, String)>::new();

        for line in self.data.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix(VERSION_MARKER) {
                let (version, description) = header.split_once(' ').unwrap_or((header, ""));
                let version: i64 = version.parse().map_err(|e| {
                    format!("cannot parse schema version '{version}' as int: {e}")
                })?;
                versions.push((version, description.trim().to_owned(), String::new()));
                continue;
            }

            match versions.last_mut() {
                Some((_, _, sql)) => {
                    sql.push_str(line);
                    sql.push('\n');
                }
                None if line.starts_with("--") => continue,
                None => {
                    return Err(format!(
                        "schema script does not start with a version header, got: {line}"
                    )
                    .into())
                }
            }
        }

        // The checksum is computed from the sql, so build once it is complete.
        Ok(versions
            .into_iter()
            .map(|(version, description, sql)| {
                Migration::new(
                    version,
                    Cow::Owned(description),
                    MigrationType::Simple,
                    Cow::Owned(sql),
                )
            })
            .collect())
    }
}

impl<'s> MigrationSource<'s> for SchemaScript<'s> {
    fn resolve(
        self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Migration>, BoxDynError>> + Send + 's>> {
        Box::pin(async move { self.parse() })
    }
}

pub fn postgresql_migrations() -> SchemaScript<'static> {
    SchemaScript {
        data: include_str!("./sql/schema.pg.sql"),
    }
}
