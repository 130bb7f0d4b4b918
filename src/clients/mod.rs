pub mod lookup_client;
pub mod mark_client;

pub use lookup_client::LookupClient;
pub use mark_client::MarkClient;
