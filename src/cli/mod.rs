//! Command line entry points
//!
//! - `serve`: run the HTTP server (default)
//! - `keygen`: print a new API key and its digest

pub mod keygen;
pub mod serve;

use clap::{Parser, Subcommand};

/// Image Server - image listing API with in-memory admission and credentials
#[derive(Parser)]
#[command(name = "image-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Generate an API key without starting the server
    Keygen(keygen::KeygenArgs),
}
