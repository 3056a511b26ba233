mod repository;
mod schema;

pub use repository::{Collection, Repository};
