mod load;
mod types;

pub use load::{
    apply_env_overrides, finish, get_packager_data_dir, load_default, load_from, EXPORT_FILE_NAME,
};
pub use types::*;
