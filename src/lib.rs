pub mod analyzer;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod notify;
pub mod poller;
pub mod session;
pub mod upload;
pub mod wardrobe;
