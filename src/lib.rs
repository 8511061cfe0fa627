pub mod core;
pub mod error;
pub mod http;
pub mod idp;
pub mod rp;
pub mod session;
pub mod token;
pub mod util;

pub use error::Error;
