use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Blob-object reference owned by a report; removed with it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(
        primary_key,
        auto_increment = false,
        column_type = "String(StringLen::N(450))"
    )]
    pub id: String,
    #[sea_orm(column_type = "String(StringLen::N(450))")]
    pub report_id: String,
    #[sea_orm(column_type = "String(StringLen::N(2048))")]
    pub blob_storage_uri: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub mime_type: String,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub file_type: String,
    pub file_size_bytes: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id"
    )]
    Report,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4().to_string()),
            ..ActiveModelTrait::default()
        }
    }
}
