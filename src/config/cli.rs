use crate::config::ServiceConfig;
use crate::core::export::OutputFormat;
use crate::utils::error::Result;
use clap::{Args, Parser};
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    #[arg(long, env = "LOOKUP_CONFIG", help = "TOML configuration file (defaults to LOOKUP_* environment variables)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl SourceArgs {
    pub fn load(&self) -> Result<ServiceConfig> {
        match &self.config {
            Some(path) => ServiceConfig::from_file(path),
            None => ServiceConfig::from_env(),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "contact-lookup")]
#[command(about = "HTTP service that looks up contact records on an upstream search form")]
pub struct ServerArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, env = "LOOKUP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "lookup")]
#[command(about = "Run a single lookup and print the merged records")]
pub struct LookupArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Phone number or ID number to search for
    pub phone: String,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    #[arg(long, short, help = "Write output to a file instead of stdout")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lookup_args() {
        let args = LookupArgs::parse_from(["lookup", "03027665767", "--format", "tsv", "-o", "out.tsv"]);
        assert_eq!(args.phone, "03027665767");
        assert_eq!(args.format, OutputFormat::Tsv);
        assert_eq!(args.output, Some(PathBuf::from("out.tsv")));
    }

    #[test]
    fn test_parse_server_args() {
        let args = ServerArgs::parse_from(["contact-lookup", "--port", "8081", "--log-json"]);
        assert_eq!(args.port, 8081);
        assert!(args.log_json);
        assert!(!args.source.verbose);
    }
}
