//! CLI parse tests.

use super::{Cli, CliCommand};
use async_trait::async_trait;
use clap::Parser;
use swcache_core::http::{Request, Response};
use swcache_core::network::{Network, NetworkError};

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

/// Origin that answers every request with 200.
pub(super) struct OkOrigin;

#[async_trait]
impl Network for OkOrigin {
    async fn fetch(&self, _request: &Request) -> Result<Response, NetworkError> {
        Ok(Response::new(200, Vec::new(), b"ok".to_vec()))
    }
}
