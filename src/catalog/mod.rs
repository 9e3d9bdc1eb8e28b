mod repo;
pub mod repo_types;
pub mod seed;
pub mod services;

pub use repo_types::{Handle, Hinge, Material, HANDLE_SIZE_CUSTOM, HANDLE_SIZE_NONE};
pub use services::{
    get_handle_by_id, get_hinge_by_id, get_material_by_id, list_handles, list_hinges,
    list_materials,
};
