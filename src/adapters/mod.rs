// Adapters layer: concrete implementations for external systems (marketplace HTTP API, local files).

pub mod http;
pub mod storage;

pub use http::{ClientOptions, ShopeeClient};
pub use storage::LocalStorage;
