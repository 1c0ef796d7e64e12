//! VideoDlx HTTP API and command line entry points.

pub mod cli;
pub mod server;
