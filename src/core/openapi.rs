use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        categories_handlers::list_categories,
        categories_handlers::list_category_names,
        categories_handlers::list_roots,
        categories_handlers::list_localized_tree,
        categories_handlers::get_category_by_slug,
        categories_handlers::get_category,
        categories_handlers::list_children,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryNameDto,
            categories_dtos::CategoryViewDto,
            categories_dtos::CategoryTranslationDto,
            categories_dtos::CategoryFormDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryNameDto>>,
            ApiResponse<Vec<categories_dtos::CategoryViewDto>>,
        )
    ),
    tags(
        (name = "categories", description = "Hierarchical product categories with uk/en translations"),
    ),
    info(
        title = "Category Catalog API",
        version = "0.1.0",
        description = "API documentation for the category catalog",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_category_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/categories",
            "/api/categories/tree",
            "/api/categories/slug/{slug}",
            "/api/categories/{id}",
            "/api/categories/{id}/children",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_swagger_modifier_overrides_info() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Catalog".to_string(),
            version: "9.9.9".to_string(),
            description: "Staging".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Catalog");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("Staging"));
    }
}
