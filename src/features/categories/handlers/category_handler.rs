use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryFormDto, CategoryNameDto, CategoryResponseDto, CategoryTranslationDto,
    CategoryTreeQuery, CategoryViewDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::modules::storage::{is_image_type_allowed, ImageUpload, ALLOWED_IMAGE_TYPES};
use crate::shared::constants::MAX_IMAGE_SIZE;
use crate::shared::types::{ApiResponse, Meta};

/// Fields collected from a category multipart form
#[derive(Debug, Default)]
struct CategoryForm {
    url_slug: Option<String>,
    priority: Option<i32>,
    /// `Some(None)` when the field was sent empty
    parent_id: Option<Option<i64>>,
    translations: Option<Vec<CategoryTranslationDto>>,
    image: Option<ImageUpload>,
}

async fn field_text(field: Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map(|text| text.trim().to_string())
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

async fn read_image(field: Field<'_>) -> Result<Option<ImageUpload>> {
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let file_name = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unnamed".to_string());

    let data = field.bytes().await.map_err(|e| {
        debug!("Failed to read image bytes: {}", e);
        AppError::BadRequest(format!("Failed to read image data: {}", e))
    })?;

    // An empty file input is the same as no image
    if data.is_empty() {
        return Ok(None);
    }

    if data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::BadRequest(format!(
            "Image too large. Maximum size is {} bytes ({} MB)",
            MAX_IMAGE_SIZE,
            MAX_IMAGE_SIZE / 1024 / 1024
        )));
    }

    if !is_image_type_allowed(&content_type) {
        return Err(AppError::BadRequest(format!(
            "Image type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_IMAGE_TYPES.join(", ")
        )));
    }

    Ok(Some(ImageUpload {
        data: data.to_vec(),
        file_name,
        content_type,
    }))
}

async fn read_category_form(mut multipart: Multipart) -> Result<CategoryForm> {
    let mut form = CategoryForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "url_slug" => {
                form.url_slug = Some(field_text(field, "url_slug").await?);
            }
            "priority" => {
                let text = field_text(field, "priority").await?;
                if !text.is_empty() {
                    let priority = text.parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid priority '{}'", text))
                    })?;
                    form.priority = Some(priority);
                }
            }
            "parent_id" => {
                let text = field_text(field, "parent_id").await?;
                form.parent_id = if text.is_empty() {
                    Some(None)
                } else {
                    let parent_id = text.parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid parent_id '{}'", text))
                    })?;
                    Some(Some(parent_id))
                };
            }
            "translations" => {
                let text = field_text(field, "translations").await?;
                if !text.is_empty() {
                    let translations = serde_json::from_str(&text).map_err(|e| {
                        AppError::BadRequest(format!("Invalid translations JSON: {}", e))
                    })?;
                    form.translations = Some(translations);
                }
            }
            "image" => {
                form.image = read_image(field).await?;
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

/// List all categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list_all().await?;
    let total = categories.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// List category names for dropdowns
///
/// Names come from the Ukrainian translation, falling back to the URL slug.
#[utoipa::path(
    get,
    path = "/api/categories/names",
    responses(
        (status = 200, description = "Category names", body = ApiResponse<Vec<CategoryNameDto>>),
    ),
    tag = "categories"
)]
pub async fn list_category_names(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryNameDto>>>> {
    let names = service.list_names().await?;
    Ok(Json(ApiResponse::success(Some(names), None, None)))
}

/// List root categories
#[utoipa::path(
    get,
    path = "/api/categories/roots",
    responses(
        (status = 200, description = "Root categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_roots(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let roots = service.list_roots().await?;
    Ok(Json(ApiResponse::success(Some(roots), None, None)))
}

/// Localized category tree
///
/// Every root category with its full subtree, named in the requested language.
/// Unknown or missing `lang` falls back to Ukrainian.
#[utoipa::path(
    get,
    path = "/api/categories/tree",
    params(CategoryTreeQuery),
    responses(
        (status = 200, description = "Localized category tree", body = ApiResponse<Vec<CategoryViewDto>>),
    ),
    tag = "categories"
)]
pub async fn list_localized_tree(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<CategoryTreeQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryViewDto>>>> {
    let tree = service
        .list_localized_root_tree(query.lang.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(Some(tree), None, None)))
}

/// Get category by URL slug
#[utoipa::path(
    get,
    path = "/api/categories/slug/{slug}",
    params(
        ("slug" = String, Path, description = "Category URL slug")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category_by_slug(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Get category by id
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// List direct children of a category
#[utoipa::path(
    get,
    path = "/api/categories/{id}/children",
    params(
        ("id" = i64, Path, description = "Parent category ID")
    ),
    responses(
        (status = 200, description = "Child categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_children(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let children = service.list_children(id).await?;
    Ok(Json(ApiResponse::success(Some(children), None, None)))
}

/// Create a category
///
/// Accepts multipart/form-data with `url_slug` (required), `priority`,
/// `parent_id`, `translations` (JSON array) and an optional `image` file.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body(
        content = CategoryFormDto,
        content_type = "multipart/form-data",
        description = "Category form with optional image",
    ),
    responses(
        (status = 201, description = "Category created"),
        (status = 400, description = "Invalid form or validation error"),
        (status = 409, description = "URL slug already exists"),
        (status = 413, description = "Image too large")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<()>>)> {
    let form = read_category_form(multipart).await?;

    let dto = CreateCategoryDto {
        url_slug: form
            .url_slug
            .ok_or_else(|| AppError::BadRequest("url_slug is required".to_string()))?,
        priority: form.priority.unwrap_or_default(),
        parent_id: form.parent_id.flatten(),
        translations: form.translations.unwrap_or_default(),
        image: form.image,
    };

    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.create(dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            None,
            Some("Category created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a category
///
/// Only the supplied fields change. An empty `parent_id` moves the category to
/// the root level; a new `image` replaces the stored one. Updating an unknown
/// id succeeds without changes.
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    request_body(
        content = CategoryFormDto,
        content_type = "multipart/form-data",
        description = "Fields to change",
    ),
    responses(
        (status = 200, description = "Category updated"),
        (status = 400, description = "Invalid form or validation error"),
        (status = 409, description = "URL slug already exists")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<()>>> {
    let form = read_category_form(multipart).await?;

    if form.translations.is_some() {
        debug!("Ignoring translations on update of category {}", id);
    }

    let dto = UpdateCategoryDto {
        id,
        url_slug: form.url_slug,
        priority: form.priority,
        parent_id: form.parent_id,
        image: form.image,
    };

    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.update(dto).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Category updated successfully".to_string()),
        None,
    )))
}

/// Delete a category
///
/// Its image is released first. Child categories become root categories.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted successfully".to_string()),
        None,
    )))
}
