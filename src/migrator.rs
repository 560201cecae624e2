use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_products_table::Migration),
            Box::new(m20240101_000003_create_cost_components_table::Migration),
            Box::new(m20240101_000004_create_product_costs_table::Migration),
            Box::new(m20240101_000005_create_price_schemes_table::Migration),
            Box::new(m20240101_000006_create_expense_categories_table::Migration),
            Box::new(m20240101_000007_create_operational_expenses_table::Migration),
            Box::new(m20240101_000008_create_sales_records_table::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
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
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone())
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

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::UserId).big_integer().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Description).text())
                        .col(ColumnDef::new(Products::Hpp).decimal_len(14, 2))
                        .col(ColumnDef::new(Products::SellingPrice).decimal_len(14, 2))
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_user_id")
                        .table(Products::Table)
                        .col(Products::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
        UserId,
        Name,
        Sku,
        Description,
        Hpp,
        SellingPrice,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_cost_components_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_cost_components_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CostComponents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CostComponents::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CostComponents::UserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CostComponents::Name).string().not_null())
                        .col(ColumnDef::new(CostComponents::Description).text())
                        .col(
                            ColumnDef::new(CostComponents::ComponentType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CostComponents::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CostComponents::UpdatedAt)
                                .timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CostComponents::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum CostComponents {
        Table,
        Id,
        UserId,
        Name,
        Description,
        ComponentType,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_product_costs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_product_costs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductCosts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductCosts::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductCosts::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductCosts::CostComponentId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductCosts::Unit).string().not_null())
                        .col(
                            ColumnDef::new(ProductCosts::UnitPrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductCosts::Quantity)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductCosts::ConversionQty)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductCosts::Amount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductCosts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductCosts::UpdatedAt).timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await?;

            // One cost line per component per product.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uniq_product_costs_product_component")
                        .table(ProductCosts::Table)
                        .col(ProductCosts::ProductId)
                        .col(ProductCosts::CostComponentId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductCosts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ProductCosts {
        Table,
        Id,
        ProductId,
        CostComponentId,
        Unit,
        UnitPrice,
        Quantity,
        ConversionQty,
        Amount,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_price_schemes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_price_schemes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PriceSchemes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PriceSchemes::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PriceSchemes::UserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PriceSchemes::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PriceSchemes::LevelName).string().not_null())
                        .col(
                            ColumnDef::new(PriceSchemes::LevelOrder)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PriceSchemes::DiscountPercentage)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PriceSchemes::PurchasePrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PriceSchemes::SellingPrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PriceSchemes::ProfitAmount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PriceSchemes::Notes).text())
                        .col(
                            ColumnDef::new(PriceSchemes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PriceSchemes::UpdatedAt).timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_price_schemes_product_level")
                        .table(PriceSchemes::Table)
                        .col(PriceSchemes::ProductId)
                        .col(PriceSchemes::LevelOrder)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PriceSchemes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PriceSchemes {
        Table,
        Id,
        UserId,
        ProductId,
        LevelName,
        LevelOrder,
        DiscountPercentage,
        PurchasePrice,
        SellingPrice,
        ProfitAmount,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_expense_categories_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_expense_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ExpenseCategories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ExpenseCategories::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ExpenseCategories::UserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ExpenseCategories::Name)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ExpenseCategories::Description).text())
                        .col(
                            ColumnDef::new(ExpenseCategories::IsSalary)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ExpenseCategories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ExpenseCategories::UpdatedAt)
                                .timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ExpenseCategories::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ExpenseCategories {
        Table,
        Id,
        UserId,
        Name,
        Description,
        IsSalary,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000007_create_operational_expenses_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_operational_expenses_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OperationalExpenses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OperationalExpenses::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OperationalExpenses::UserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OperationalExpenses::ExpenseCategoryId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OperationalExpenses::Name).string())
                        .col(ColumnDef::new(OperationalExpenses::Unit).string().not_null())
                        .col(
                            ColumnDef::new(OperationalExpenses::Quantity)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OperationalExpenses::Amount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OperationalExpenses::TotalAmount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OperationalExpenses::Year)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OperationalExpenses::Month)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OperationalExpenses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OperationalExpenses::UpdatedAt)
                                .timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_operational_expenses_period")
                        .table(OperationalExpenses::Table)
                        .col(OperationalExpenses::UserId)
                        .col(OperationalExpenses::Year)
                        .col(OperationalExpenses::Month)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OperationalExpenses::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum OperationalExpenses {
        Table,
        Id,
        UserId,
        ExpenseCategoryId,
        Name,
        Unit,
        Quantity,
        Amount,
        TotalAmount,
        Year,
        Month,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000008_create_sales_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_sales_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesRecords::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesRecords::UserId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesRecords::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesRecords::Year).integer().not_null())
                        .col(ColumnDef::new(SalesRecords::Month).integer().not_null())
                        .col(
                            ColumnDef::new(SalesRecords::NumberOfSales)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesRecords::Hpp)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesRecords::SellingPrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesRecords::UpdatedAt).timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await?;

            // One sales record per product per period.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uniq_sales_records_product_period")
                        .table(SalesRecords::Table)
                        .col(SalesRecords::ProductId)
                        .col(SalesRecords::Year)
                        .col(SalesRecords::Month)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum SalesRecords {
        Table,
        Id,
        UserId,
        ProductId,
        Year,
        Month,
        NumberOfSales,
        Hpp,
        SellingPrice,
        CreatedAt,
        UpdatedAt,
    }
}
