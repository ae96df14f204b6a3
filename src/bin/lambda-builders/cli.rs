//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Environment variable holding an `EnvFilter` directive for logging.
pub const LOG_ENV: &str = "LAMBDA_BUILDERS_LOG";

/// Lambda Builders - build a Lambda function from a JSON-RPC request
///
/// The request is read from the first argument, or from stdin when no
/// argument is given. The response is written to stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "lambda-builders")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON-RPC request; read from stdin when omitted
    pub request: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file to use instead of ~/.lambda-builders/config.toml
    #[arg(long, value_name = "PATH", env = "LAMBDA_BUILDERS_CONFIG")]
    pub config: Option<PathBuf>,
}
