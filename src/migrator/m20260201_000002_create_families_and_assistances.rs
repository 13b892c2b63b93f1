use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Families::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Families::Id)
                            .uuid()
                            .not_null()
                            .default(Expr::cust("gen_random_uuid()"))
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Families::FamilyName).text().not_null())
                    .col(ColumnDef::new(Families::HeadOfFamily).text().not_null())
                    .col(ColumnDef::new(Families::Phone).text())
                    .col(ColumnDef::new(Families::RegionId).uuid())
                    .col(ColumnDef::new(Families::Address).text())
                    .col(ColumnDef::new(Families::LocationLink).text())
                    .col(
                        ColumnDef::new(Families::FamilySize)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Families::Notes).text())
                    .col(ColumnDef::new(Families::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(Families::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Families::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::cust("family_size >= 1"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_families_region")
                            .from(Families::Table, Families::RegionId)
                            .to(Regions::Table, Regions::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_families_created_by")
                            .from(Families::Table, Families::CreatedBy)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_families_region_id")
                    .table(Families::Table)
                    .col(Families::RegionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assistances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assistances::Id)
                            .uuid()
                            .not_null()
                            .default(Expr::cust("gen_random_uuid()"))
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assistances::Name).text().not_null())
                    .col(
                        ColumnDef::new(Assistances::Type)
                            .text()
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(Assistances::Description).text())
                    .col(ColumnDef::new(Assistances::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(Assistances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Assistances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assistances_created_by")
                            .from(Assistances::Table, Assistances::CreatedBy)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assistances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Families::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Families {
    Table,
    Id,
    FamilyName,
    HeadOfFamily,
    Phone,
    RegionId,
    Address,
    LocationLink,
    FamilySize,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Assistances {
    Table,
    Id,
    Name,
    Type,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Regions {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
}
