pub mod category_handler;

pub use category_handler::{
    __path_create_category, __path_delete_category, __path_get_category,
    __path_get_category_by_slug, __path_list_categories, __path_list_category_names,
    __path_list_children, __path_list_localized_tree, __path_list_roots,
    __path_update_category, create_category, delete_category, get_category,
    get_category_by_slug, list_categories, list_category_names, list_children,
    list_localized_tree, list_roots, update_category,
};
