pub mod adaptors;
pub mod auth;
pub mod gate;
pub mod network;
pub mod storage;
pub mod uploads;
