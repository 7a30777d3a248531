use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Opaque id of the authenticated creator.
    pub owner_id: String,

    pub title: String,
    pub note: String,

    /// Public URLs of the attached media.
    pub video_location: Option<String>,
    pub photo_location: Option<String>,
    /// Object key behind `photo_location`.
    pub derived_path: Option<String>,

    pub emotion: Option<String>,
    pub expression: Option<String>,
    pub confidence: Option<f64>,

    /// Written by the enrichment job only.
    pub tags: Option<Json>,
    pub insight_highlight: Option<String>,
    pub insight_suggestion: Option<String>,
    pub insight_strategy: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
