use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    IsAnonymous,
    Role,
    Email,
    PhoneNumber,
    HashedDeviceId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .string_len(450)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(50)
                            .not_null()
                            .default("citizen"),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(256)
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::PhoneNumber)
                            .string_len(20)
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::HashedDeviceId)
                            .string_len(256)
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
