pub mod device;
pub mod id_space;
pub mod loaders;
pub mod record_store;

pub use device::{Category, DeviceRecord, MetricKey, UNKNOWN_SCORE};
pub use id_space::IdSpace;
pub use loaders::{load_all_json_files, load_json_to_store, save_store_to_json};
pub use record_store::RecordStore;
