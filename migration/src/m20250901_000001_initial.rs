use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Username,
    FullName,
    Phone,
    UserType,
    Status,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
    LastLoginAt,
}

#[derive(DeriveIden)]
enum UserAddresses {
    Table,
    Id,
    UserId,
    City,
    State,
    IsPrimary,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SubscriptionPlans {
    Table,
    Id,
    Name,
    Description,
    PriceMonthlyCents,
    MaxAdsPerMonth,
    AiDescriptionsIncluded,
    FeaturedAdsIncluded,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserSubscriptions {
    Table,
    Id,
    UserId,
    PlanId,
    Status,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    SortOrder,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Advertisements {
    Table,
    Id,
    UserId,
    CategoryId,
    Title,
    Description,
    PriceCents,
    Status,
    ModerationStatus,
    IsFeatured,
    AiDescriptionUsed,
    ViewCount,
    FavoriteCount,
    CreatedAt,
    PublishedAt,
}

#[derive(DeriveIden)]
enum AdvertisementImages {
    Table,
    Id,
    AdvertisementId,
    ImageUrl,
    SortOrder,
    IsPrimary,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserFavorites {
    Table,
    Id,
    UserId,
    AdvertisementId,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Phone).string_len(20).null())
                    .col(ColumnDef::new(Users::UserType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Users::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::LastLoginAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAddresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAddresses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserAddresses::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserAddresses::City)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::State)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserAddresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_addresses_user")
                            .from(UserAddresses::Table, UserAddresses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlans::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Name)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SubscriptionPlans::Description).text().null())
                    .col(
                        ColumnDef::new(SubscriptionPlans::PriceMonthlyCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::MaxAdsPerMonth)
                            .integer()
                            .null(), // null means unlimited
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::AiDescriptionsIncluded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::FeaturedAdsIncluded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::CreatedAt)
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
                    .table(UserSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSubscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserSubscriptions::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserSubscriptions::PlanId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserSubscriptions::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::CurrentPeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_subscriptions_user")
                            .from(UserSubscriptions::Table, UserSubscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_subscriptions_plan")
                            .from(UserSubscriptions::Table, UserSubscriptions::PlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Categories::Slug)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Categories::Description).text().null())
                    .col(
                        ColumnDef::new(Categories::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Categories::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
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
                    .table(Advertisements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Advertisements::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Advertisements::UserId).uuid().not_null())
                    .col(ColumnDef::new(Advertisements::CategoryId).uuid().not_null())
                    .col(
                        ColumnDef::new(Advertisements::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Advertisements::Description).text().not_null())
                    .col(
                        ColumnDef::new(Advertisements::PriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Advertisements::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Advertisements::ModerationStatus)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Advertisements::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Advertisements::AiDescriptionUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Advertisements::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Advertisements::FavoriteCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Advertisements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Advertisements::PublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_advertisements_user")
                            .from(Advertisements::Table, Advertisements::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_advertisements_category")
                            .from(Advertisements::Table, Advertisements::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdvertisementImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdvertisementImages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdvertisementImages::AdvertisementId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdvertisementImages::ImageUrl)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdvertisementImages::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AdvertisementImages::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AdvertisementImages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_advertisement_images_advertisement")
                            .from(
                                AdvertisementImages::Table,
                                AdvertisementImages::AdvertisementId,
                            )
                            .to(Advertisements::Table, Advertisements::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserFavorites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserFavorites::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserFavorites::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserFavorites::AdvertisementId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserFavorites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorites_user")
                            .from(UserFavorites::Table, UserFavorites::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorites_advertisement")
                            .from(UserFavorites::Table, UserFavorites::AdvertisementId)
                            .to(Advertisements::Table, Advertisements::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_addresses_user_id")
                    .table(UserAddresses::Table)
                    .col(UserAddresses::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_subscriptions_user_id")
                    .table(UserSubscriptions::Table)
                    .col(UserSubscriptions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_advertisements_user_id")
                    .table(Advertisements::Table)
                    .col(Advertisements::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_advertisements_category_id")
                    .table(Advertisements::Table)
                    .col(Advertisements::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_advertisements_created_at")
                    .table(Advertisements::Table)
                    .col(Advertisements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_advertisement_images_advertisement_id")
                    .table(AdvertisementImages::Table)
                    .col(AdvertisementImages::AdvertisementId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_favorites_unique")
                    .table(UserFavorites::Table)
                    .col(UserFavorites::UserId)
                    .col(UserFavorites::AdvertisementId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Full-text search over title + description, portuguese config.
        // sea-query has no builder support for generated tsvector columns.
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE advertisements
                ADD COLUMN search_vector tsvector
                GENERATED ALWAYS AS (
                    to_tsvector('portuguese', coalesce(title, '') || ' ' || coalesce(description, ''))
                ) STORED;
                CREATE INDEX idx_advertisements_search_vector
                ON advertisements USING GIN (search_vector);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserFavorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdvertisementImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Advertisements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSubscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubscriptionPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAddresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
