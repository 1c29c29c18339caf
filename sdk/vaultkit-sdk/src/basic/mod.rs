pub mod account;
pub mod builder;
pub mod executor;
pub mod permission;
pub mod position;
pub mod session;
pub mod status;
