use std::time::Duration;

use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::journal;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("journal_server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await;

    Ok(db)
}

/// Index backing the per-owner month listing:
/// SELECT ... FROM journals WHERE owner_id = ? AND created_at >= ? AND created_at < ?
async fn ensure_indexes(db: &DatabaseConnection) {
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_journals_owner_created")
        .table(journal::Entity)
        .col(journal::Column::OwnerId)
        .col(journal::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_journals_owner_created exists"),
        Err(e) => warn!("Failed to create index idx_journals_owner_created: {}", e),
    }
}
