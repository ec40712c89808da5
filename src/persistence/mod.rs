pub mod files;
pub mod store;

pub use files::{
    app_data_dir, atomic_write, default_ledger_path, default_shelf_path, ensure_parent_dir,
    read_file,
};
pub use store::{load_json, save_json, LedgerStore};
