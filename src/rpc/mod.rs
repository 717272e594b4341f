//! Stdio JSON-RPC surface exposing the scraper as callable tools.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::RpcServer;
