pub mod auth;
pub mod concepts;
pub mod questions;
pub mod results;
pub mod sessions;
pub mod tests;
pub mod trends;
pub mod users;
