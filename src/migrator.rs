use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_customers_table::Migration),
            Box::new(m20240101_000002_create_lookup_tables::Migration),
            Box::new(m20240101_000003_create_custom_products_table::Migration),
            Box::new(m20240101_000004_create_quotes_table::Migration),
            Box::new(m20240101_000005_create_orders_table::Migration),
            Box::new(m20240101_000006_create_order_items_table::Migration),
            Box::new(m20240101_000007_create_payments_table::Migration),
            Box::new(m20240101_000008_create_order_status_history_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::TaxId).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::Zone).string().not_null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_name")
                        .table(Customers::Table)
                        .col(Customers::Name)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Name,
        Phone,
        Email,
        TaxId,
        Address,
        Zone,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_lookup_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_lookup_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaperTypes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaperTypes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaperTypes::Name).string().not_null())
                        .col(
                            ColumnDef::new(PaperTypes::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MatrixSizes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MatrixSizes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MatrixSizes::Name).string().not_null())
                        .col(
                            ColumnDef::new(MatrixSizes::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PaperTypes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MatrixSizes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PaperTypes {
        Table,
        Id,
        Name,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum MatrixSizes {
        Table,
        Id,
        Name,
        CreatedAt,
    }
}

mod m20240101_000003_create_custom_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_custom_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CustomProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomProducts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomProducts::CustomerId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomProducts::InternalName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomProducts::Description).string().null())
                        .col(ColumnDef::new(CustomProducts::Measures).string().null())
                        .col(ColumnDef::new(CustomProducts::PaperTypeId).uuid().null())
                        .col(ColumnDef::new(CustomProducts::MatrixSizeId).uuid().null())
                        .col(ColumnDef::new(CustomProducts::Colors).string().null())
                        .col(
                            ColumnDef::new(CustomProducts::Observations)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CustomProducts::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomProducts::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_custom_products_customer_id")
                        .table(CustomProducts::Table)
                        .col(CustomProducts::CustomerId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomProducts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CustomProducts {
        Table,
        Id,
        CustomerId,
        InternalName,
        Description,
        Measures,
        PaperTypeId,
        MatrixSizeId,
        Colors,
        Observations,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_quotes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_quotes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Quotes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Quotes::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Quotes::ProductId).uuid().null())
                        .col(ColumnDef::new(Quotes::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(Quotes::PaperCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotes::PrintCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotes::MatrixCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotes::OtherCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotes::Margin)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Quotes::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(Quotes::TotalPrice).decimal().not_null())
                        .col(ColumnDef::new(Quotes::Notes).string().null())
                        .col(ColumnDef::new(Quotes::Status).string().not_null())
                        .col(ColumnDef::new(Quotes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Quotes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotes_customer_id")
                        .table(Quotes::Table)
                        .col(Quotes::CustomerId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Quotes {
        Table,
        Id,
        CustomerId,
        ProductId,
        Quantity,
        PaperCost,
        PrintCost,
        MatrixCost,
        OtherCost,
        Margin,
        UnitPrice,
        TotalPrice,
        Notes,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::QuoteId).uuid().null())
                        .col(
                            ColumnDef::new(Orders::Total)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Balance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Paid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::OrderDate).timestamp().not_null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            // A quote converts to at most one order
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_quote_id")
                        .table(Orders::Table)
                        .col(Orders::QuoteId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        CustomerId,
        QuoteId,
        Total,
        Balance,
        Paid,
        Status,
        Notes,
        OrderDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_order_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderItems::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(OrderItems::Subtotal).decimal().not_null())
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        UnitPrice,
        Subtotal,
        CreatedAt,
    }
}

mod m20240101_000007_create_payments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_payments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Payments::Amount).decimal().not_null())
                        .col(ColumnDef::new(Payments::Method).string().not_null())
                        .col(
                            ColumnDef::new(Payments::IsDeferred)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Payments::AccreditationDate)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(Payments::PaymentDate).timestamp().not_null())
                        .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_order_id")
                        .table(Payments::Table)
                        .col(Payments::OrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        OrderId,
        Amount,
        Method,
        IsDeferred,
        AccreditationDate,
        PaymentDate,
        CreatedAt,
    }
}

mod m20240101_000008_create_order_status_history_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_order_status_history_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderStatusHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderStatusHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderStatusHistory::OrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderStatusHistory::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderStatusHistory::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_status_history_order_id")
                        .table(OrderStatusHistory::Table)
                        .col(OrderStatusHistory::OrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderStatusHistory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderStatusHistory {
        Table,
        Id,
        OrderId,
        Status,
        CreatedAt,
    }
}
