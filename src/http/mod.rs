pub mod encoding;
pub mod server;
