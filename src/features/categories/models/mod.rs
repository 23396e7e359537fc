mod category;

pub use category::{
    Category, CategoryCatalog, CategoryName, CategoryTranslation, NewCategory,
    NewCategoryTranslation,
};
