pub mod attrs;
pub mod constants;
pub mod error;
pub mod header;
pub mod host;
pub mod message;
pub mod util;
