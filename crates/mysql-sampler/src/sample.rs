//! Single-row sampling at an offset.

use crate::error::SamplerError;
use mysql_async::{prelude::*, Pool, Row};
use mysql_types::{row_to_sampled_row, SampledRow};

/// Source of sampled rows.
///
/// The emulation loop is generic over this trait so it can run against a
/// live MySQL pool or an in-memory fake.
#[async_trait::async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch the row found after skipping `offset` rows of `table`.
    ///
    /// Returns `Ok(None)` when the table has `offset` rows or fewer.
    async fn fetch_row(&self, table: &str, offset: u64) -> Result<Option<SampledRow>, SamplerError>;
}

/// Row sampler backed by a MySQL connection pool.
///
/// Rows are selected with `LIMIT offset, 1` and no `ORDER BY`, so a
/// "random" row is only as random as the engine's natural scan order for
/// the table. That order is not guaranteed to be stable between calls.
pub struct MySqlRowSampler {
    pool: Pool,
}

impl MySqlRowSampler {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Close every pooled connection.
    pub async fn disconnect(self) -> Result<(), SamplerError> {
        self.pool.disconnect().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RowSource for MySqlRowSampler {
    async fn fetch_row(
        &self,
        table: &str,
        offset: u64,
    ) -> Result<Option<SampledRow>, SamplerError> {
        let sql = select_row_sql(table)?;
        let mut conn = self.pool.get_conn().await?;

        // Prepared statement, so values come back typed (binary protocol).
        let row: Option<Row> = conn.exec_first(sql, (offset,)).await?;

        row.map(row_to_sampled_row)
            .transpose()
            .map_err(|source| SamplerError::Conversion {
                table: table.to_string(),
                source,
            })
    }
}

/// Quote a MySQL identifier with backticks.
pub fn quote_identifier(name: &str) -> Result<String, SamplerError> {
    if name.trim().is_empty() || name.contains('\0') {
        return Err(SamplerError::InvalidTable(name.to_string()));
    }
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Generate the single-row SELECT for a table; the offset is bound as a parameter.
pub fn select_row_sql(table: &str) -> Result<String, SamplerError> {
    Ok(format!("SELECT * FROM {} LIMIT ?, 1", quote_identifier(table)?))
}
