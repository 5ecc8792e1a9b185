pub mod explore;
pub mod not_found;
mod panels;
pub mod schema;
