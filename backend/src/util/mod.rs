pub mod disposition;
pub mod secret;
