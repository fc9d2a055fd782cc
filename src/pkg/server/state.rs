use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use sqlx::{PgPool, Pool, Postgres, Transaction, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};

use crate::{conf::settings, pkg::internal::storage::s3_client, prelude::Result};

pub fn db_pool() -> Result<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_pool_max_connections)
        .acquire_timeout(Duration::from_secs(settings.database_acquire_timeout_secs))
        .connect_lazy(&settings.database_url)?;
    Ok(pool)
}

#[async_trait]
pub trait GetTxn {
    async fn begin_txn(&self) -> Result<Transaction<'static, Postgres>>;
}

#[async_trait]
impl GetTxn for PgPool {
    async fn begin_txn(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.begin().await?)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub db_pool: Arc<PgPool>,
    pub s3_client: Arc<S3Client>,
}

impl AppState {
    pub async fn new() -> Result<AppState> {
        Ok(AppState {
            db_pool: Arc::new(db_pool()?),
            s3_client: Arc::new(s3_client()),
        })
    }
}
