use serde_json::Value;
use sqlx::migrate::Migrator;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};

use crate::error::ServiceResult;
use crate::models::{BoundValue, Entity, EntitySpec, InsertStatement};

mod migration;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
}

impl AppState {
    pub async fn connect(options: PgConnectOptions) -> ServiceResult<Self> {
        let pool = PgPoolOptions::new().connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and make sure the schema is in place.
    pub async fn from_pool(pool: Pool<Postgres>) -> ServiceResult<Self> {
        let migrator = Migrator::new(migration::postgresql_migrations()).await?;
        migrator.run(&pool).await?;

        Ok(AppState { pool })
    }

    pub async fn connection(&self) -> ServiceResult<DatabaseConnection> {
        let connection = self.pool.acquire().await?;
        Ok(DatabaseConnection { connection })
    }
}

pub struct DatabaseConnection {
    pub connection: PoolConnection<Postgres>,
}

impl DatabaseConnection {
    /// All rows of a table as JSON objects, ordered by id.
    pub async fn get_all_rows(&mut self, entity: Entity) -> ServiceResult<Vec<Value>> {
        let sql = entity.select_all_sql();
        let rows = sqlx::query_scalar::<_, Value>(&sql)
            .fetch_all(&mut *self.connection)
            .await?;

        Ok(rows)
    }

    /// Execute a validated insert and return the row as stored.
    pub async fn insert_row(
        &mut self,
        spec: &EntitySpec,
        statement: InsertStatement,
    ) -> ServiceResult<Value> {
        let mut query = sqlx::query_scalar::<_, Value>(&statement.sql);
        for value in statement.values {
            query = match value {
                BoundValue::Text(text) => query.bind(text),
                BoundValue::Integer(number) => query.bind(number),
                BoundValue::Decimal(text) => query.bind(text),
            };
        }

        let row = query.fetch_one(&mut *self.connection).await?;
        log::debug!("Inserted into {}: {}", spec.table, row);

        Ok(row)
    }
}
