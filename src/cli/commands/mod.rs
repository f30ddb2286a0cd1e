pub mod migrate;
pub mod seed;
pub mod summary;
pub mod user;
