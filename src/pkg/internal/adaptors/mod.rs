pub mod connections;
pub mod jobs;
pub mod portfolio;
pub mod posts;
pub mod profiles;
