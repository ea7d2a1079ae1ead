pub mod config;
pub mod logging;

pub mod checksum;
pub mod cookie;
pub mod error;
pub mod fetcher;
pub mod request;
