use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::SubscriptionService;
use uuid::Uuid;

/// Known category slugs for template dispatch. Unrecognized slugs fall back
/// to the generic template rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategorySlug {
    PlantasInterior,
    PlantasExterior,
    Suculentas,
    Vasos,
    Ferramentas,
    Sementes,
    Fertilizantes,
    Decoracao,
}

impl CategorySlug {
    fn parse(slug: &str) -> Option<Self> {
        match slug {
            "plantas-interior" => Some(Self::PlantasInterior),
            "plantas-exterior" => Some(Self::PlantasExterior),
            "suculentas" => Some(Self::Suculentas),
            "vasos" => Some(Self::Vasos),
            "ferramentas" => Some(Self::Ferramentas),
            "sementes" => Some(Self::Sementes),
            "fertilizantes" => Some(Self::Fertilizantes),
            "decoracao" => Some(Self::Decoracao),
            _ => None,
        }
    }
}

/// Deterministic template rendering: the same (title, category) pair always
/// produces the same text.
fn render_description(title: &str, category: &str) -> String {
    match CategorySlug::parse(category) {
        Some(CategorySlug::PlantasInterior) => format!(
            "Esta {} é perfeita para ambientes internos, trazendo vida e frescor para sua casa. \
             Planta saudável e bem cuidada, ideal para quem busca decorar com natureza. \
             Fácil de cuidar e adapta-se bem a diferentes condições de luz. \
             Entregamos com vaso e instruções de cuidado.",
            title.to_lowercase()
        ),
        Some(CategorySlug::Suculentas) => format!(
            "Lindas {} selecionadas especialmente para você. \
             Suculentas são plantas resistentes e de baixa manutenção, perfeitas para iniciantes. \
             Ideais para decoração de interiores e exteriores. \
             Plantas saudáveis e prontas para o plantio.",
            title.to_lowercase()
        ),
        Some(CategorySlug::Vasos) => format!(
            "{title} de alta qualidade, perfeito para suas plantas favoritas. \
             Design moderno e funcional que combina com qualquer ambiente. \
             Material resistente e durável. Ideal para plantas de pequeno a médio porte."
        ),
        Some(CategorySlug::Ferramentas) => format!(
            "{title} profissional para jardinagem. \
             Ferramenta de alta qualidade que facilita o cuidado com suas plantas. \
             Ergonômica e durável, ideal tanto para iniciantes quanto para jardineiros experientes."
        ),
        Some(CategorySlug::Sementes) => format!(
            "{title} de excelente qualidade e alta taxa de germinação. \
             Sementes selecionadas e testadas para garantir os melhores resultados. \
             Inclui instruções detalhadas de plantio e cuidados."
        ),
        Some(CategorySlug::Fertilizantes) => format!(
            "{title} premium para nutrição completa das suas plantas. \
             Fórmula balanceada que promove crescimento saudável e floração abundante. \
             Fácil aplicação e resultados visíveis."
        ),
        Some(CategorySlug::Decoracao) => format!(
            "{title} que adiciona charme e personalidade ao seu jardim. \
             Peça decorativa de qualidade que resiste às intempéries. \
             Perfeita para criar um ambiente acolhedor e natural."
        ),
        // No dedicated copy for outdoor plants; generic fallback, same as
        // unknown slugs
        Some(CategorySlug::PlantasExterior) | None => format!(
            "{title} de excelente qualidade. \
             Produto cuidadosamente selecionado para atender suas necessidades de jardinagem. \
             Entrega rápida e segura."
        ),
    }
}

#[derive(Clone)]
pub struct AiService {
    subscription_service: SubscriptionService,
    generation_delay_ms: u64,
}

impl AiService {
    pub fn new(subscription_service: SubscriptionService, generation_delay_ms: u64) -> Self {
        Self {
            subscription_service,
            generation_delay_ms,
        }
    }

    /// Plan-gated description generation. No external inference: a fixed
    /// template lookup behind an artificial delay.
    pub async fn generate_description(
        &self,
        user_id: Uuid,
        request: GenerateDescriptionRequest,
    ) -> AppResult<GenerateDescriptionResponse> {
        if request.title.trim().len() < 3 {
            return Err(AppError::ValidationError(
                "Título é obrigatório".to_string(),
            ));
        }
        if request.category.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Categoria é obrigatória".to_string(),
            ));
        }

        if !self.subscription_service.has_ai_descriptions(user_id).await? {
            return Err(AppError::Forbidden(
                "Recurso disponível apenas para usuários Premium. Faça upgrade do seu plano."
                    .to_string(),
            ));
        }

        tokio::time::sleep(std::time::Duration::from_millis(self.generation_delay_ms)).await;

        Ok(GenerateDescriptionResponse {
            description: render_description(request.title.trim(), request.category.trim()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_deterministic() {
        let first = render_description("Monstera Deliciosa", "suculentas");
        let second = render_description("Monstera Deliciosa", "suculentas");
        assert_eq!(first, second);
    }

    #[test]
    fn test_title_lowercased_in_prose() {
        let text = render_description("Monstera Deliciosa", "plantas-interior");
        assert!(text.contains("monstera deliciosa"));
        assert!(!text.contains("Monstera Deliciosa"));
    }

    #[test]
    fn test_unknown_slug_falls_back_to_generic() {
        let text = render_description("Kit jardinagem", "xyz");
        assert!(text.starts_with("Kit jardinagem de excelente qualidade."));
    }

    #[test]
    fn test_outdoor_plants_use_generic_template() {
        assert_eq!(
            render_description("Ipê amarelo", "plantas-exterior"),
            render_description("Ipê amarelo", "xyz")
        );
    }

    #[test]
    fn test_each_known_category_mentions_title() {
        for slug in [
            "plantas-interior",
            "suculentas",
            "vasos",
            "ferramentas",
            "sementes",
            "fertilizantes",
            "decoracao",
        ] {
            let text = render_description("Samambaia", slug);
            assert!(
                text.to_lowercase().contains("samambaia"),
                "template for {slug} should mention the title"
            );
        }
    }
}
