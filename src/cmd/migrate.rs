use std::sync::Arc;

use crate::{
    conf::settings,
    pkg::{
        internal::{storage, uploads::Bucket},
        server::state::GetTxn,
    },
    prelude::Result,
};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions};
use standard_error::{Interpolate, StandardError};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn apply() -> Result<()> {
    let pool = Arc::new(
        PgPoolOptions::new()
            .connect(&settings.database_url)
            .await
            .map_err(|e| StandardError::new("ERR-DB-000").interpolate_err(e.to_string()))?,
    );

    tracing::debug!("connected to db");
    let mut tx = pool.begin_txn().await?;
    MIGRATOR
        .run(&mut *tx)
        .await
        .map_err(|e| StandardError::new("ERR-DB-000").interpolate_err(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| StandardError::new("ERR-DB-000").interpolate_err(e.to_string()))?;
    tracing::info!("migrations applied");

    let client = storage::s3_client();
    for bucket in Bucket::ALL {
        match storage::create_bucket(&client, bucket.as_str()).await? {
            Some(_) => tracing::info!("created bucket {}", bucket.as_str()),
            None => tracing::debug!("bucket {} already present", bucket.as_str()),
        }
    }
    Ok(())
}
