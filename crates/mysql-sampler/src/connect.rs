//! Connection pool construction from loaded credentials.

use crate::error::SamplerError;
use db_credentials::Credentials;
use mysql_async::{prelude::*, OptsBuilder, Pool};

/// Build a connection pool for the given credentials.
///
/// No connection is opened here; the pool connects on first use with the
/// driver's default pool limits.
pub fn connect(credentials: &Credentials) -> Pool {
    let opts = OptsBuilder::default()
        .ip_or_hostname(credentials.host.clone())
        .tcp_port(credentials.port)
        .user(Some(credentials.user.clone()))
        .pass(Some(credentials.password.clone()))
        .db_name(Some(credentials.database.clone()))
        .init(vec!["SET NAMES utf8mb4"]);

    tracing::debug!("Created MySQL pool for {}", credentials);
    Pool::new(opts)
}

/// Check out one connection and ping the server.
pub async fn verify(pool: &Pool) -> Result<(), SamplerError> {
    let mut conn = pool.get_conn().await?;
    conn.ping().await?;
    Ok(())
}
