//! Periodic purge of expired "not attending" tokens.
//!
//! Redemption already rejects and deletes an expired token it is handed;
//! this job removes the ones nobody ever clicked.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tutorhub_db::repositories::TokenRepo;

/// Run the cleanup loop until `cancel` is triggered.
pub async fn run(pool: PgPool, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Token cleanup job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Token cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match TokenRepo::delete_expired(&pool, Utc::now()).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Token cleanup: purged expired tokens");
                    }
                    Ok(_) => tracing::debug!("Token cleanup: nothing to purge"),
                    Err(e) => {
                        tracing::error!(error = %e, "Token cleanup failed");
                    }
                }
            }
        }
    }
}
