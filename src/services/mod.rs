pub mod adapter;
pub mod http_client;
pub mod query_cache;
pub mod render_cache;
pub mod token_store;
