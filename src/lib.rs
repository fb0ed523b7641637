pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod output;
pub mod parser;
pub mod table;
pub mod transform;
pub mod view;
