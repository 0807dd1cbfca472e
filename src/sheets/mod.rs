pub mod auth;
pub mod client;
pub mod loader;
pub mod parse;
