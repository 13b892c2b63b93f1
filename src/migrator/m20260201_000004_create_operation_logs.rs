use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const APPEND_ONLY: &str = r#"
CREATE OR REPLACE FUNCTION operation_logs_append_only() RETURNS trigger AS $$
BEGIN
    RAISE EXCEPTION 'operation_logs is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER operation_logs_no_mutation
    BEFORE UPDATE OR DELETE ON operation_logs
    FOR EACH ROW EXECUTE FUNCTION operation_logs_append_only();
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OperationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OperationLogs::Id)
                            .uuid()
                            .not_null()
                            .default(Expr::cust("gen_random_uuid()"))
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OperationLogs::UserId).uuid())
                    .col(ColumnDef::new(OperationLogs::Action).text().not_null())
                    .col(
                        ColumnDef::new(OperationLogs::ActionKind)
                            .text()
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(OperationLogs::TableName).text().not_null())
                    .col(ColumnDef::new(OperationLogs::RecordId).text())
                    .col(ColumnDef::new(OperationLogs::Details).json_binary())
                    .col(
                        ColumnDef::new(OperationLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_operation_logs_user")
                            .from(OperationLogs::Table, OperationLogs::UserId)
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
                    .name("idx_operation_logs_created_at")
                    .table(OperationLogs::Table)
                    .col(OperationLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager.get_connection().execute_unprepared(APPEND_ONLY).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DROP TRIGGER IF EXISTS operation_logs_no_mutation ON operation_logs; \
                 DROP FUNCTION IF EXISTS operation_logs_append_only();",
            )
            .await?;
        manager
            .drop_table(Table::drop().table(OperationLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OperationLogs {
    Table,
    Id,
    UserId,
    Action,
    ActionKind,
    TableName,
    RecordId,
    Details,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
}
