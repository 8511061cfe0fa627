pub mod idp;
pub mod rp;
