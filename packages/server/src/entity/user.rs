use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Only `last_entry` is maintained by this service; the rest of the profile
/// belongs to the identity provider.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub last_entry: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
