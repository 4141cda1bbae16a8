pub mod endpoints;
pub mod params;
pub mod response;

/// Domain entities (doctors, rooms, posts, ...) are owned by the backend and
/// forwarded unmodified.
pub type Record = serde_json::Value;
