//! Hierarchical product categories with uk/en translations and images.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | List all categories |
//! | GET | `/api/categories/names` | List `(id, name)` pairs |
//! | GET | `/api/categories/roots` | List root categories |
//! | GET | `/api/categories/tree?lang=` | Localized tree of root categories |
//! | GET | `/api/categories/slug/{slug}` | Get category by URL slug |
//! | GET | `/api/categories/{id}` | Get category by id |
//! | GET | `/api/categories/{id}/children` | List direct children |
//! | POST | `/api/categories` | Create category (multipart) |
//! | PUT | `/api/categories/{id}` | Update category (multipart) |
//! | DELETE | `/api/categories/{id}` | Delete category and its image |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::CategoryService;
