pub mod auth;
pub mod jobs;
pub mod network;
pub mod posts;
pub mod probes;
pub mod profile;
pub mod recruiters;
pub mod ui;
