//! CLI adapter for the `haystack` query client.
//!
//! Thin clap front-end over [`crate::net::client`]: one connection,
//! one query, one verdict. Exit code 0 when the line exists, 1 when
//! it does not, 2 on transport or TLS failure.

use crate::core::error::{HaystackError, Result};
use crate::core::types::Verdict;
use crate::net::client::{self, ClientOptions, TlsMode};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

/// haystack - exact line-match lookup client
///
/// Sends a literal query line to a haystackd server and prints
/// whether the corpus contains it.
#[derive(Parser, Debug)]
#[command(name = "haystack")]
#[command(version)]
#[command(about = "Exact line-match lookup client", long_about = None)]
pub struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1", env = "HAYSTACK_HOST")]
    pub host: String,

    /// Server port
    #[arg(long, default_value_t = 44445, env = "HAYSTACK_PORT")]
    pub port: u16,

    /// Connect with TLS
    #[arg(long)]
    pub tls: bool,

    /// PEM CA bundle to trust (implies --tls)
    #[arg(long, value_name = "PEM")]
    pub cafile: Option<PathBuf>,

    /// Skip server certificate verification (testing only)
    #[arg(long)]
    pub insecure: bool,

    /// Literal line to look up; prompts on stdin when omitted
    pub query: Option<String>,
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<Verdict> {
    let tls = if cli.insecure {
        TlsMode::Insecure
    } else if let Some(cafile) = cli.cafile {
        TlsMode::CaFile(cafile)
    } else if cli.tls {
        return Err(HaystackError::Config(
            "--tls needs either --cafile or --insecure".to_string(),
        ));
    } else {
        TlsMode::Off
    };

    let query = match cli.query {
        Some(query) => query,
        None => prompt_query()?,
    };

    let options = ClientOptions {
        host: cli.host,
        port: cli.port,
        tls,
    };

    let verdict = client::query(&options, &query).await?;
    println!("{}", output::verdict_line(verdict));
    Ok(verdict)
}

fn prompt_query() -> Result<String> {
    print!("query> ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Output formatting for the verdict (respects NO_COLOR)
pub mod output {
    use crate::core::types::Verdict;
    use colored::Colorize;

    pub fn verdict_line(verdict: Verdict) -> String {
        match verdict {
            Verdict::Found => "STRING EXISTS".green().bold().to_string(),
            Verdict::NotFound => "STRING NOT FOUND".red().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["haystack", "banana"]);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 44445);
        assert!(!cli.tls);
        assert_eq!(cli.query.as_deref(), Some("banana"));
    }

    #[test]
    fn test_cli_tls_flags() {
        let cli = Cli::parse_from(["haystack", "--tls", "--cafile", "ca.pem", "banana"]);
        assert!(cli.tls);
        assert_eq!(cli.cafile, Some(PathBuf::from("ca.pem")));
    }

    #[tokio::test]
    async fn test_tls_without_trust_source_is_rejected() {
        let cli = Cli::parse_from(["haystack", "--tls", "banana"]);
        let err = run(cli).await.unwrap_err();
        assert!(err.message().contains("--cafile"));
    }
}
