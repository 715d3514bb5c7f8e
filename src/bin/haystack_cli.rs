//! haystack CLI - one-shot query client
//!
//! Sends a single literal line to a haystackd server and reports the
//! verdict.
//!
//! # Examples
//!
//! ```bash
//! # Plaintext lookup
//! haystack --host 10.0.0.5 --port 44445 "6;0;1;26;0;8;3;0;"
//!
//! # TLS with a private CA
//! haystack --tls --cafile ca.pem "some exact line"
//!
//! # Prompt for the query interactively
//! haystack
//! ```

use clap::Parser;
use haystack::cli::{run, Cli};
use haystack::Verdict;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(Verdict::Found) => std::process::exit(0),
        Ok(Verdict::NotFound) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
