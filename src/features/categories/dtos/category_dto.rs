use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::features::categories::models::{
    Category, CategoryCatalog, CategoryName, CategoryTranslation, NewCategory,
    NewCategoryTranslation,
};
use crate::modules::storage::ImageUpload;
use crate::shared::constants::NO_TRANSLATION_MARKER;
use crate::shared::language::{is_supported_language, Language};

/// Response DTO for category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub url_slug: String,
    pub priority: i32,
    /// Stored image asset name
    pub image: Option<String>,
    /// Public URL of the image
    pub image_url: Option<String>,
    pub parent_id: Option<i64>,
}

impl CategoryResponseDto {
    pub fn from_category(category: Category, image_url: impl Fn(&str) -> String) -> Self {
        let url = category.image.as_deref().map(image_url);
        Self {
            id: category.id,
            url_slug: category.url_slug,
            priority: category.priority,
            image: category.image,
            image_url: url,
            parent_id: category.parent_id,
        }
    }
}

/// Response DTO for dropdown-style category listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryNameDto {
    pub id: i64,
    pub name: String,
}

impl From<CategoryName> for CategoryNameDto {
    fn from(c: CategoryName) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

/// Category rendered in one language, with its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryViewDto {
    pub id: i64,
    pub url_slug: String,
    pub priority: i32,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<i64>,
    /// Translated name, or "[no translation]"
    pub name: String,
    /// Translated description, empty when missing
    pub description: String,
    pub children: Vec<CategoryViewDto>,
}

/// Parent and translation lookups built once per bulk fetch
struct CategoryIndex<'a> {
    children: HashMap<Option<i64>, Vec<&'a Category>>,
    translations: HashMap<i64, Vec<&'a CategoryTranslation>>,
}

impl<'a> CategoryIndex<'a> {
    fn new(catalog: &'a CategoryCatalog) -> Self {
        let mut children: HashMap<Option<i64>, Vec<&Category>> = HashMap::new();
        for category in &catalog.categories {
            children.entry(category.parent_id).or_default().push(category);
        }

        let mut translations: HashMap<i64, Vec<&CategoryTranslation>> = HashMap::new();
        for translation in &catalog.translations {
            translations
                .entry(translation.category_id)
                .or_default()
                .push(translation);
        }

        Self {
            children,
            translations,
        }
    }

    fn children_of(&self, parent_id: Option<i64>) -> &[&'a Category] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn translation(&self, category_id: i64, language: Language) -> Option<&'a CategoryTranslation> {
        self.translations
            .get(&category_id)?
            .iter()
            .copied()
            .find(|t| t.language == language.code())
    }
}

impl CategoryViewDto {
    /// Build the localized forest of root categories.
    ///
    /// Siblings keep the catalog's order. A category without a translation in
    /// `language` gets the placeholder name; no other language is tried.
    pub fn build_tree(
        catalog: &CategoryCatalog,
        language: Language,
        image_url: &dyn Fn(&str) -> String,
    ) -> Vec<CategoryViewDto> {
        let index = CategoryIndex::new(catalog);

        index
            .children_of(None)
            .iter()
            .map(|root| Self::build_node(root, &index, language, image_url))
            .collect()
    }

    fn build_node(
        category: &Category,
        index: &CategoryIndex<'_>,
        language: Language,
        image_url: &dyn Fn(&str) -> String,
    ) -> CategoryViewDto {
        let (name, description) = match index.translation(category.id, language) {
            Some(t) => (t.name.clone(), t.description.clone().unwrap_or_default()),
            None => (NO_TRANSLATION_MARKER.to_string(), String::new()),
        };

        let children = index
            .children_of(Some(category.id))
            .iter()
            .map(|child| Self::build_node(child, index, language, image_url))
            .collect();

        CategoryViewDto {
            id: category.id,
            url_slug: category.url_slug.clone(),
            priority: category.priority,
            image: category.image.clone(),
            image_url: category.image.as_deref().map(image_url),
            parent_id: category.parent_id,
            name,
            description,
            children,
        }
    }
}

/// Query params for the localized tree
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryTreeQuery {
    /// "en" or "uk"; anything else falls back to "uk"
    pub lang: Option<String>,
}

fn validate_language(language: &str) -> Result<(), ValidationError> {
    if is_supported_language(language) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_language")
            .with_message("language must be one of: uk, en".into()))
    }
}

fn validate_unique_languages(dto: &CreateCategoryDto) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for translation in &dto.translations {
        if !seen.insert(translation.language.as_str()) {
            return Err(ValidationError::new("duplicate_language")
                .with_message(format!("duplicate translation for '{}'", translation.language).into()));
        }
    }
    Ok(())
}

/// Translation supplied when creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryTranslationDto {
    #[validate(custom(function = "validate_language"))]
    #[schema(example = "en")]
    pub language: String,

    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 4000, message = "description must not exceed 4000 characters"))]
    pub description: Option<String>,
}

/// Create request, assembled from the multipart form
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_unique_languages"))]
pub struct CreateCategoryDto {
    #[validate(
        length(min = 1, max = 200, message = "url_slug must be 1-200 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "url_slug must be lowercase alphanumeric segments separated by single hyphens"
        )
    )]
    pub url_slug: String,

    pub priority: i32,

    pub parent_id: Option<i64>,

    #[validate(nested)]
    pub translations: Vec<CategoryTranslationDto>,

    pub image: Option<ImageUpload>,
}

impl CreateCategoryDto {
    /// Field-by-field mapping into a new category carrying `image`
    pub fn into_new_category(self, image: Option<String>) -> NewCategory {
        NewCategory {
            url_slug: self.url_slug,
            priority: self.priority,
            image,
            parent_id: self.parent_id,
            translations: self
                .translations
                .into_iter()
                .map(|t| NewCategoryTranslation {
                    language: t.language,
                    name: t.name,
                    description: t.description,
                })
                .collect(),
        }
    }
}

/// Partial update request; `None` leaves a field unchanged
#[derive(Debug, Clone, Validate)]
pub struct UpdateCategoryDto {
    pub id: i64,

    #[validate(
        length(min = 1, max = 200, message = "url_slug must be 1-200 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "url_slug must be lowercase alphanumeric segments separated by single hyphens"
        )
    )]
    pub url_slug: Option<String>,

    pub priority: Option<i32>,

    /// `Some(None)` moves the category to the root level
    pub parent_id: Option<Option<i64>>,

    pub image: Option<ImageUpload>,
}

impl UpdateCategoryDto {
    /// Copy the supplied fields onto `category`; the image is handled separately
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(url_slug) = &self.url_slug {
            category.url_slug = url_slug.clone();
        }
        if let Some(priority) = self.priority {
            category.priority = priority;
        }
        if let Some(parent_id) = self.parent_id {
            category.parent_id = parent_id;
        }
    }
}

/// Multipart form for creating or updating a category
/// Note: This struct is for Swagger UI documentation only.
/// The actual handlers use axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CategoryFormDto {
    #[schema(example = "hand-tools")]
    pub url_slug: Option<String>,
    #[schema(example = 10)]
    pub priority: Option<i32>,
    /// Parent category id; empty on update moves the category to the root
    pub parent_id: Option<String>,
    /// JSON array of translations (create only)
    #[schema(example = r#"[{"language":"uk","name":"Ручні інструменти"},{"language":"en","name":"Hand tools"}]"#)]
    pub translations: Option<String>,
    /// Image file (jpeg, png, gif or webp)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}
