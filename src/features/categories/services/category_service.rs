use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryNameDto, CategoryResponseDto, CategoryViewDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::Category;
use crate::features::categories::repositories::{CategoryStore, CategoryUnitOfWork};
use crate::modules::storage::{ImageStore, ImageUpload};
use crate::shared::language::Language;

/// Service for category operations
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    images: Arc<dyn ImageStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { store, images }
    }

    fn to_dto(&self, category: Category) -> CategoryResponseDto {
        CategoryResponseDto::from_category(category, |name| self.images.image_url(name))
    }

    fn to_dtos(&self, categories: Vec<Category>) -> Vec<CategoryResponseDto> {
        categories.into_iter().map(|c| self.to_dto(c)).collect()
    }

    /// List every category (flat, untranslated)
    pub async fn list_all(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.get_all().await?;
        Ok(self.to_dtos(categories))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<CategoryResponseDto>> {
        let category = self.store.get_by_id(id).await?;
        Ok(category.map(|c| self.to_dto(c)))
    }

    /// List `(id, name)` pairs for dropdowns
    pub async fn list_names(&self) -> Result<Vec<CategoryNameDto>> {
        let names = self.store.get_names().await?;
        Ok(names.into_iter().map(CategoryNameDto::from).collect())
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<CategoryResponseDto>> {
        let category = self.store.get_by_slug(slug).await?;
        Ok(category.map(|c| self.to_dto(c)))
    }

    /// List categories without a parent
    pub async fn list_roots(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.get_roots().await?;
        Ok(self.to_dtos(categories))
    }

    /// List direct children of a category (not recursive)
    pub async fn list_children(&self, parent_id: i64) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.get_children(parent_id).await?;
        Ok(self.to_dtos(categories))
    }

    /// Localized forest of root categories
    ///
    /// `lang` is normalized to "en" or "uk". All categories and translations
    /// are read in a single bulk fetch.
    pub async fn list_localized_root_tree(&self, lang: Option<&str>) -> Result<Vec<CategoryViewDto>> {
        let language = Language::normalize(lang);
        debug!("Building category tree in '{}'", language);
        let catalog = self.store.get_all_with_translations().await?;

        let image_url = |name: &str| self.images.image_url(name);
        Ok(CategoryViewDto::build_tree(&catalog, language, &image_url))
    }

    /// Create a category, storing its image first when one is supplied
    pub async fn create(&self, mut dto: CreateCategoryDto) -> Result<()> {
        self.ensure_valid_parent(None, dto.parent_id).await?;

        let upload = dto.image.take().filter(|upload| !upload.is_empty());
        let image = self.save_image(upload).await?;

        let slug = dto.url_slug.clone();
        let mut work = self.store.begin();
        work.insert(dto.into_new_category(image.clone()));
        self.commit(work, image.as_deref()).await?;

        info!("Category created: slug={}", slug);
        Ok(())
    }

    /// Update a category; a missing category is silently ignored
    pub async fn update(&self, mut dto: UpdateCategoryDto) -> Result<()> {
        let Some(mut category) = self.store.get_by_id(dto.id).await? else {
            debug!("Update skipped, category {} not found", dto.id);
            return Ok(());
        };

        if let Some(parent_id) = dto.parent_id {
            self.ensure_valid_parent(Some(category.id), parent_id).await?;
        }

        dto.apply_to(&mut category);

        let mut new_image = None;
        if let Some(upload) = dto.image.take().filter(|upload| !upload.is_empty()) {
            if let Some(old_image) = category.image.as_deref() {
                self.images.delete_image_if_exists(old_image).await?;
            }
            let name = self.images.save_image(upload).await?;
            category.image = Some(name.clone());
            new_image = Some(name);
        }

        let id = category.id;
        let mut work = self.store.begin();
        work.update(category);
        self.commit(work, new_image.as_deref()).await?;

        info!("Category updated: id={}", id);
        Ok(())
    }

    /// Delete a category and release its image; a missing category is silently ignored
    pub async fn delete(&self, id: i64) -> Result<()> {
        let Some(category) = self.store.get_by_id(id).await? else {
            debug!("Delete skipped, category {} not found", id);
            return Ok(());
        };

        if let Some(image) = category.image.as_deref() {
            self.images.delete_image_if_exists(image).await?;
        }

        let mut work = self.store.begin();
        work.delete(id);
        work.save().await?;

        info!("Category deleted: id={}", id);
        Ok(())
    }

    async fn save_image(&self, upload: Option<ImageUpload>) -> Result<Option<String>> {
        match upload {
            Some(upload) => Ok(Some(self.images.save_image(upload).await?)),
            None => Ok(None),
        }
    }

    /// Commit `work`; on failure release an image stored by this call
    async fn commit(
        &self,
        mut work: Box<dyn CategoryUnitOfWork>,
        new_image: Option<&str>,
    ) -> Result<()> {
        if let Err(e) = work.save().await {
            if let Some(name) = new_image {
                if let Err(cleanup) = self.images.delete_image_if_exists(name).await {
                    warn!(
                        "Failed to release image '{}' after commit failure: {}",
                        name, cleanup
                    );
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Reject a missing parent, and for existing categories any parent that
    /// would close a cycle
    ///
    /// Reads committed data, so two concurrent moves can both pass; the
    /// store repeats the ancestry check inside the commit.
    async fn ensure_valid_parent(&self, category_id: Option<i64>, parent_id: Option<i64>) -> Result<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        if Some(parent_id) == category_id {
            return Err(AppError::Validation(
                "A category cannot be its own parent".to_string(),
            ));
        }

        let parent = self.store.get_by_id(parent_id).await?.ok_or_else(|| {
            AppError::Validation(format!("Parent category {} does not exist", parent_id))
        })?;

        let Some(category_id) = category_id else {
            return Ok(());
        };

        let mut visited = HashSet::from([parent.id]);
        let mut cursor = parent.parent_id;
        while let Some(ancestor_id) = cursor {
            if ancestor_id == category_id {
                return Err(AppError::Validation(format!(
                    "Category {} cannot be moved under its own descendant {}",
                    category_id, parent_id
                )));
            }
            if !visited.insert(ancestor_id) {
                break;
            }
            cursor = self
                .store
                .get_by_id(ancestor_id)
                .await?
                .and_then(|ancestor| ancestor.parent_id);
        }

        Ok(())
    }
}
