pub mod client;
pub mod error;
pub mod http;
pub mod pending;
pub mod wallet;
