use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: i64,
    pub url_slug: String,
    pub priority: i32,
    /// Stored image asset name
    pub image: Option<String>,
    /// `None` for root categories
    pub parent_id: Option<i64>,
}

/// Database model for a category's text in one language
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CategoryTranslation {
    pub category_id: i64,
    pub language: String,
    pub name: String,
    pub description: Option<String>,
}

/// Lightweight `(id, name)` row for dropdown-style listings
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CategoryName {
    pub id: i64,
    pub name: String,
}

/// Category that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub url_slug: String,
    pub priority: i32,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    pub translations: Vec<NewCategoryTranslation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategoryTranslation {
    pub language: String,
    pub name: String,
    pub description: Option<String>,
}

/// Every category plus every translation, as returned by one bulk fetch
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    pub categories: Vec<Category>,
    pub translations: Vec<CategoryTranslation>,
}
