pub mod config;
pub mod export;
pub mod info;
pub mod init;
pub mod layers;
pub mod papers;
pub mod validate;
