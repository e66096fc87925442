mod category_handler;
mod version_handler;

pub use category_handler::{
    __path_add_category, __path_delete_category, __path_get_layout, __path_get_state,
    __path_get_tree, __path_list_categories, __path_save_changes, __path_start_editing,
    __path_stop_editing, __path_update_category, add_category, delete_category, get_layout,
    get_state, get_tree, list_categories, save_changes, start_editing, stop_editing,
    update_category,
};
pub use version_handler::{
    __path_activate_version, __path_create_version, __path_list_versions,
    __path_select_version, __path_update_version, activate_version, create_version,
    list_versions, select_version, update_version,
};
