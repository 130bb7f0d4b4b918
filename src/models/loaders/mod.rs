pub mod json_loader;

pub use json_loader::{
    load_all_json_files, load_json_to_store, parse_store, save_store_to_json, store_to_json,
};
