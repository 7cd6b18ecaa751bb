use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Providers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Providers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Providers::Name).string().not_null())
                    .col(ColumnDef::new(Providers::BaseUrl).string().not_null())
                    .col(
                        ColumnDef::new(Providers::VendorKind)
                            .string()
                            .not_null()
                            .default("openai_compatible"),
                    )
                    .col(
                        ColumnDef::new(Providers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Providers::Priority)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Providers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Providers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProviderModels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProviderModels::ProviderId).string().not_null())
                    .col(ColumnDef::new(ProviderModels::ModelName).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(ProviderModels::ProviderId)
                            .col(ProviderModels::ModelName),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_models_provider_id")
                            .from(ProviderModels::Table, ProviderModels::ProviderId)
                            .to(Providers::Table, Providers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProviderApiKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderApiKeys::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderApiKeys::ProviderId).string().not_null())
                    .col(ColumnDef::new(ProviderApiKeys::Name).string().null())
                    .col(ColumnDef::new(ProviderApiKeys::ApiKey).string().not_null())
                    .col(ColumnDef::new(ProviderApiKeys::Model).string().null())
                    .col(
                        ColumnDef::new(ProviderApiKeys::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ProviderApiKeys::Priority)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProviderApiKeys::TotalRequests)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProviderApiKeys::FailedRequests)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ProviderApiKeys::LastError).text().null())
                    .col(
                        ColumnDef::new(ProviderApiKeys::LastUsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProviderApiKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ProviderApiKeys::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_api_keys_provider_id")
                            .from(ProviderApiKeys::Table, ProviderApiKeys::ProviderId)
                            .to(Providers::Table, Providers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_provider_api_keys_provider_id")
                    .table(ProviderApiKeys::Table)
                    .col(ProviderApiKeys::ProviderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RotationSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RotationSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RotationSettings::Strategy)
                            .string()
                            .not_null()
                            .default("per_provider"),
                    )
                    .col(
                        ColumnDef::new(RotationSettings::FallbackEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RotationSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApiUsageLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiUsageLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApiUsageLogs::ProviderId).string().null())
                    .col(ColumnDef::new(ApiUsageLogs::ProviderKeyId).string().null())
                    .col(ColumnDef::new(ApiUsageLogs::ModelName).string().not_null())
                    .col(ColumnDef::new(ApiUsageLogs::RequestPath).string().not_null())
                    .col(ColumnDef::new(ApiUsageLogs::Status).string().not_null())
                    .col(ColumnDef::new(ApiUsageLogs::StatusCode).integer().null())
                    .col(ColumnDef::new(ApiUsageLogs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(ApiUsageLogs::ResponseTimeMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ApiUsageLogs::TokensUsed).big_integer().null())
                    .col(
                        ColumnDef::new(ApiUsageLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_api_usage_logs_created_at")
                    .table(ApiUsageLogs::Table)
                    .col(ApiUsageLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApiUsageLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RotationSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProviderApiKeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProviderModels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Providers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Providers {
    Table,
    Id,
    Name,
    BaseUrl,
    VendorKind,
    IsActive,
    Priority,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProviderModels {
    Table,
    ProviderId,
    ModelName,
}

#[derive(DeriveIden)]
enum ProviderApiKeys {
    Table,
    Id,
    ProviderId,
    Name,
    ApiKey,
    Model,
    IsActive,
    Priority,
    TotalRequests,
    FailedRequests,
    LastError,
    LastUsedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RotationSettings {
    Table,
    Id,
    Strategy,
    FallbackEnabled,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ApiUsageLogs {
    Table,
    Id,
    ProviderId,
    ProviderKeyId,
    ModelName,
    RequestPath,
    Status,
    StatusCode,
    ErrorMessage,
    ResponseTimeMs,
    TokensUsed,
    CreatedAt,
}
