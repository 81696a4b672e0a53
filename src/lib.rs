pub mod config;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod logging;
pub mod models;
pub mod output;
pub mod page_parser;
pub mod pagination;
pub mod parser;
pub mod progress;
