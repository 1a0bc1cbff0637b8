pub mod plan;
pub mod version;
