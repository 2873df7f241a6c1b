use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Reports {
    Table,
    Id,
    Title,
    DescriptionText,
    Latitude,
    Longitude,
    Status,
    CategoryId,
    AiConfidence,
    TranscribedVoiceText,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reports::Id)
                            .string_len(450)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reports::Title).string_len(500).not_null())
                    .col(ColumnDef::new(Reports::DescriptionText).text().not_null())
                    .col(ColumnDef::new(Reports::Latitude).double().not_null())
                    .col(ColumnDef::new(Reports::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(Reports::Status)
                            .string_len(50)
                            .not_null()
                            .default("Submitted"),
                    )
                    .col(
                        ColumnDef::new(Reports::CategoryId)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reports::AiConfidence)
                            .double()
                            .null()
                            .check(Expr::col(Reports::AiConfidence).between(0.0, 1.0)),
                    )
                    .col(
                        ColumnDef::new(Reports::TranscribedVoiceText)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(Reports::UserId).string_len(450).null())
                    .col(
                        ColumnDef::new(Reports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Reports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_user_id")
                            .from(Reports::Table, Reports::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_user_id")
                    .table(Reports::Table)
                    .col(Reports::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await
    }
}
