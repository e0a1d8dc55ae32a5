pub mod config;
pub mod logging;

pub mod cache;
pub mod checksum;
pub mod clients;
pub mod dispatcher;
pub mod host;
pub mod http;
pub mod intercept;
pub mod lifecycle;
pub mod multipart;
pub mod network;

#[cfg(test)]
pub(crate) mod testing;
