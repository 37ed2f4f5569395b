pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;
pub mod upstream;
pub mod utils;
