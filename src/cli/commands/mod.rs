pub mod cancel;
pub mod config;
pub mod health;
pub mod status;
pub mod submit;
pub mod watch;
