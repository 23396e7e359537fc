use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    Category, CategoryCatalog, CategoryName, CategoryTranslation,
};
use crate::features::categories::repositories::{
    CategoryStore, CategoryUnitOfWork, PendingChange,
};
use crate::shared::constants::DEFAULT_LANGUAGE;
use crate::shared::test_helpers::Journal;

#[derive(Clone, Default)]
struct MemoryState {
    categories: Vec<Category>,
    translations: Vec<CategoryTranslation>,
    next_id: i64,
}

/// Committed data plus the hooks every unit of work reports to
#[derive(Default)]
struct Shared {
    state: Mutex<MemoryState>,
    journal: Option<Journal>,
    fail_next_save: AtomicBool,
}

/// Category store held in memory, mirroring the PostgreSQL store's rules
#[derive(Default)]
pub struct InMemoryCategoryStore {
    shared: Arc<Shared>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            shared: Arc::new(Shared {
                journal: Some(journal),
                ..Shared::default()
            }),
        }
    }

    /// Add a committed category with `(language, name, description)` translations
    pub fn seed(
        &self,
        id: i64,
        url_slug: &str,
        parent_id: Option<i64>,
        image: Option<&str>,
        translations: &[(&str, &str, Option<&str>)],
    ) {
        let mut state = self.shared.state.lock().unwrap();
        state.categories.push(Category {
            id,
            url_slug: url_slug.to_string(),
            priority: 0,
            image: image.map(str::to_string),
            parent_id,
        });
        for (language, name, description) in translations {
            state.translations.push(CategoryTranslation {
                category_id: id,
                language: language.to_string(),
                name: name.to_string(),
                description: description.map(str::to_string),
            });
        }
        state.next_id = state.next_id.max(id);
    }

    /// Make the next `save` fail without applying anything
    pub fn fail_next_save(&self) {
        self.shared.fail_next_save.store(true, Ordering::SeqCst);
    }

    pub fn committed(&self) -> Vec<Category> {
        self.shared.state.lock().unwrap().categories.clone()
    }

    pub fn translations_of(&self, category_id: i64) -> Vec<CategoryTranslation> {
        self.shared
            .state
            .lock()
            .unwrap()
            .translations
            .iter()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect()
    }

    fn filtered(&self, predicate: impl Fn(&Category) -> bool) -> Vec<Category> {
        self.shared
            .state
            .lock()
            .unwrap()
            .categories
            .iter()
            .filter(|c| predicate(c))
            .cloned()
            .collect()
    }
}

impl MemoryState {
    fn slug_taken(&self, slug: &str, except: Option<i64>) -> bool {
        self.categories
            .iter()
            .any(|c| c.url_slug == slug && Some(c.id) != except)
    }

    fn parent_exists(&self, parent_id: Option<i64>) -> bool {
        parent_id.map_or(true, |id| self.categories.iter().any(|c| c.id == id))
    }

    fn closes_cycle(&self, id: i64) -> bool {
        let parent_of = |id: i64| {
            self.categories
                .iter()
                .find(|c| c.id == id)
                .and_then(|c| c.parent_id)
        };

        let mut cursor = parent_of(id);
        for _ in 0..self.categories.len() {
            match cursor {
                Some(ancestor) if ancestor == id => return true,
                Some(ancestor) => cursor = parent_of(ancestor),
                None => return false,
            }
        }
        false
    }

    fn apply(&mut self, change: PendingChange) -> Result<String> {
        match change {
            PendingChange::Insert(new) => {
                if self.slug_taken(&new.url_slug, None) {
                    return Err(AppError::Conflict(
                        "A category with this URL slug already exists.".to_string(),
                    ));
                }
                if !self.parent_exists(new.parent_id) {
                    return Err(AppError::BadRequest(
                        "Referenced category does not exist.".to_string(),
                    ));
                }

                self.next_id += 1;
                let id = self.next_id;
                self.categories.push(Category {
                    id,
                    url_slug: new.url_slug,
                    priority: new.priority,
                    image: new.image,
                    parent_id: new.parent_id,
                });
                for translation in new.translations {
                    self.translations.push(CategoryTranslation {
                        category_id: id,
                        language: translation.language,
                        name: translation.name,
                        description: translation.description,
                    });
                }
                Ok(format!("store.insert:{}", id))
            }
            PendingChange::Update(category) => {
                if self.slug_taken(&category.url_slug, Some(category.id)) {
                    return Err(AppError::Conflict(
                        "A category with this URL slug already exists.".to_string(),
                    ));
                }
                if !self.parent_exists(category.parent_id) {
                    return Err(AppError::BadRequest(
                        "Referenced category does not exist.".to_string(),
                    ));
                }

                let id = category.id;
                if let Some(existing) = self.categories.iter_mut().find(|c| c.id == id) {
                    *existing = category;
                }
                if self.closes_cycle(id) {
                    return Err(AppError::Validation(format!(
                        "Category {} cannot be moved under its own descendant",
                        id
                    )));
                }
                Ok(format!("store.update:{}", id))
            }
            PendingChange::Delete(id) => {
                self.categories.retain(|c| c.id != id);
                self.translations.retain(|t| t.category_id != id);
                // Same as ON DELETE SET NULL
                for child in self.categories.iter_mut() {
                    if child.parent_id == Some(id) {
                        child.parent_id = None;
                    }
                }
                Ok(format!("store.delete:{}", id))
            }
        }
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn get_all(&self) -> Result<Vec<Category>> {
        Ok(self.filtered(|_| true))
    }

    async fn get_all_with_translations(&self) -> Result<CategoryCatalog> {
        let state = self.shared.state.lock().unwrap();
        Ok(CategoryCatalog {
            categories: state.categories.clone(),
            translations: state.translations.clone(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.filtered(|c| c.id == id).into_iter().next())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(self.filtered(|c| c.url_slug == slug).into_iter().next())
    }

    async fn get_roots(&self) -> Result<Vec<Category>> {
        Ok(self.filtered(|c| c.parent_id.is_none()))
    }

    async fn get_children(&self, parent_id: i64) -> Result<Vec<Category>> {
        Ok(self.filtered(|c| c.parent_id == Some(parent_id)))
    }

    async fn get_names(&self) -> Result<Vec<CategoryName>> {
        let state = self.shared.state.lock().unwrap();
        Ok(state
            .categories
            .iter()
            .map(|c| {
                let name = state
                    .translations
                    .iter()
                    .find(|t| t.category_id == c.id && t.language == DEFAULT_LANGUAGE)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| c.url_slug.clone());
                CategoryName { id: c.id, name }
            })
            .collect())
    }

    fn begin(&self) -> Box<dyn CategoryUnitOfWork> {
        Box::new(MemoryUnitOfWork {
            shared: Arc::clone(&self.shared),
            pending: Vec::new(),
        })
    }
}

struct MemoryUnitOfWork {
    shared: Arc<Shared>,
    pending: Vec<PendingChange>,
}

#[async_trait]
impl CategoryUnitOfWork for MemoryUnitOfWork {
    fn stage(&mut self, change: PendingChange) {
        self.pending.push(change);
    }

    async fn save(&mut self) -> Result<()> {
        let changes = std::mem::take(&mut self.pending);

        if self.shared.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal("simulated commit failure".to_string()));
        }

        let entries = {
            let mut state = self.shared.state.lock().unwrap();

            // All-or-nothing, like the database transaction
            let mut staged = state.clone();
            let mut entries = Vec::new();
            for change in changes {
                entries.push(staged.apply(change)?);
            }
            *state = staged;
            entries
        };

        if let Some(journal) = &self.shared.journal {
            journal.lock().unwrap().extend(entries);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::models::{NewCategory, NewCategoryTranslation};

    fn new_category(slug: &str, parent_id: Option<i64>) -> NewCategory {
        NewCategory {
            url_slug: slug.to_string(),
            priority: 0,
            image: None,
            parent_id,
            translations: vec![NewCategoryTranslation {
                language: "uk".to_string(),
                name: slug.to_uppercase(),
                description: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_staged_changes_invisible_until_save() {
        let store = InMemoryCategoryStore::new();
        let mut work = store.begin();
        work.insert(new_category("tools", None));
        assert!(store.get_all().await.unwrap().is_empty());

        work.save().await.unwrap();
        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].url_slug, "tools");
        assert_eq!(store.translations_of(all[0].id).len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rolls_back_whole_save() {
        let store = InMemoryCategoryStore::new();
        store.seed(1, "tools", None, None, &[]);

        let mut work = store.begin();
        work.insert(new_category("garden", None));
        work.insert(new_category("tools", None));
        let result = work.save().await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(store.committed().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_other_units_staged() {
        let store = InMemoryCategoryStore::new();
        store.seed(1, "tools", None, None, &[]);

        let mut reprioritize = store.begin();
        let mut tools = store.get_by_id(1).await.unwrap().unwrap();
        tools.priority = 9;
        reprioritize.update(tools);

        let mut duplicate = store.begin();
        duplicate.insert(new_category("tools", None));
        assert!(matches!(
            duplicate.save().await,
            Err(AppError::Conflict(_))
        ));

        reprioritize.save().await.unwrap();
        assert_eq!(store.get_by_id(1).await.unwrap().unwrap().priority, 9);
    }

    #[tokio::test]
    async fn test_save_rejects_cycle_from_concurrent_moves() {
        let store = InMemoryCategoryStore::new();
        store.seed(1, "tools", None, None, &[]);
        store.seed(2, "garden", None, None, &[]);

        // Both moves were checked against the same committed tree
        let mut tools = store.get_by_id(1).await.unwrap().unwrap();
        let mut garden = store.get_by_id(2).await.unwrap().unwrap();
        tools.parent_id = Some(2);
        garden.parent_id = Some(1);

        let mut first = store.begin();
        first.update(tools);
        let mut second = store.begin();
        second.update(garden);

        first.save().await.unwrap();
        assert!(matches!(
            second.save().await,
            Err(AppError::Validation(_))
        ));

        let roots = store.get_roots().await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, 2);
    }

    #[tokio::test]
    async fn test_delete_detaches_children() {
        let store = InMemoryCategoryStore::new();
        store.seed(1, "tools", None, None, &[("uk", "Інструменти", None)]);
        store.seed(2, "hand-tools", Some(1), None, &[]);

        let mut work = store.begin();
        work.delete(1);
        work.save().await.unwrap();

        assert!(store.translations_of(1).is_empty());
        let remaining = store.get_roots().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, 2);
    }
}
