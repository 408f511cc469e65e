pub mod activity;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod model;
pub mod paths;
pub mod sink;
pub mod sources;
pub mod watcher;
