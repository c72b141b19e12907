use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Plan and category catalogs are fixed reference data; ids are
        // generated here so reseeding an existing database is a no-op.
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                INSERT INTO subscription_plans
                    (id, name, description, price_monthly_cents, max_ads_per_month,
                     ai_descriptions_included, featured_ads_included)
                VALUES
                    (gen_random_uuid(), 'Grátis', 'Perfeito para começar', 0, 3, FALSE, FALSE),
                    (gen_random_uuid(), 'Premium', 'Ideal para vendedores ativos', 990, NULL, TRUE, TRUE),
                    (gen_random_uuid(), 'Profissional', 'Para grandes vendedores', 1990, NULL, TRUE, TRUE)
                ON CONFLICT (name) DO NOTHING;

                INSERT INTO categories (id, name, slug, description, sort_order)
                VALUES
                    (gen_random_uuid(), 'Plantas de Interior', 'plantas-interior', 'Plantas ideais para ambientes internos', 1),
                    (gen_random_uuid(), 'Plantas de Exterior', 'plantas-exterior', 'Plantas para jardins e áreas externas', 2),
                    (gen_random_uuid(), 'Suculentas', 'suculentas', 'Suculentas e cactos', 3),
                    (gen_random_uuid(), 'Vasos e Jardineiras', 'vasos', 'Vasos, jardineiras e recipientes', 4),
                    (gen_random_uuid(), 'Ferramentas', 'ferramentas', 'Ferramentas de jardinagem', 5),
                    (gen_random_uuid(), 'Sementes', 'sementes', 'Sementes e mudas', 6),
                    (gen_random_uuid(), 'Fertilizantes', 'fertilizantes', 'Fertilizantes e adubos', 7),
                    (gen_random_uuid(), 'Decoração', 'decoracao', 'Itens decorativos para jardim', 8)
                ON CONFLICT (slug) DO NOTHING;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DELETE FROM categories WHERE slug IN (
                    'plantas-interior', 'plantas-exterior', 'suculentas', 'vasos',
                    'ferramentas', 'sementes', 'fertilizantes', 'decoracao'
                );
                DELETE FROM subscription_plans WHERE name IN ('Grátis', 'Premium', 'Profissional');
                "#,
            )
            .await?;

        Ok(())
    }
}
