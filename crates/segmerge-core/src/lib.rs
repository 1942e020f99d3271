pub mod config;
pub mod logging;

pub mod downloader;
pub mod fetch;
pub mod joblist;
pub mod manifest;
pub mod merge;
pub mod orchestrator;
pub mod resolver;
pub mod retry;
pub mod storage;
