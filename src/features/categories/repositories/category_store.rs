use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::categories::models::{
    Category, CategoryCatalog, CategoryName, NewCategory,
};

/// Persistence port for categories.
///
/// Reads observe committed data only. Mutations go through a
/// [`CategoryUnitOfWork`] obtained from `begin`; each unit owns its staged
/// changes, so concurrent callers never commit or discard each other's work.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Every category, in storage order
    async fn get_all(&self) -> Result<Vec<Category>>;

    /// Every category together with every translation, fetched in one go
    async fn get_all_with_translations(&self) -> Result<CategoryCatalog>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Categories without a parent
    async fn get_roots(&self) -> Result<Vec<Category>>;

    /// Direct children of `parent_id` only
    async fn get_children(&self, parent_id: i64) -> Result<Vec<Category>>;

    /// `(id, name)` pairs named in the default language, slug when untranslated
    async fn get_names(&self) -> Result<Vec<CategoryName>>;

    /// Start an empty unit of work owned by the caller
    fn begin(&self) -> Box<dyn CategoryUnitOfWork>;
}

/// Changes staged by one caller and flushed together by `save`.
///
/// Nothing is written until `save`. `save` applies every staged change in one
/// transaction and empties the unit whether or not the commit succeeds.
#[async_trait]
pub trait CategoryUnitOfWork: Send {
    fn stage(&mut self, change: PendingChange);

    fn insert(&mut self, category: NewCategory) {
        self.stage(PendingChange::Insert(category));
    }

    fn update(&mut self, category: Category) {
        self.stage(PendingChange::Update(category));
    }

    fn delete(&mut self, id: i64) {
        self.stage(PendingChange::Delete(id));
    }

    /// Commit staged changes. A moved category whose ancestry loops back to
    /// itself fails the whole commit with a validation error.
    async fn save(&mut self) -> Result<()>;
}

/// A mutation waiting for the next `save`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    Insert(NewCategory),
    Update(Category),
    Delete(i64),
}
