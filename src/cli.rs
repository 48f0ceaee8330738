use std::path::PathBuf;

use clap::Parser;

/// HTTP backend for the browser-based XML editor
#[derive(Parser, Debug, Clone)]
#[command(name = "edit-xml")]
#[command(about = "Serve the XML editor API: validate, format, parse to a tree, save and load files")]
#[command(version)]
pub struct Cli {
    /// Optional TOML configuration file; CLI flags override its values
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Interface to bind the HTTP listener to
    #[arg(long = "bind", help = "Bind address (default 127.0.0.1)")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long = "port", help = "Listen port (default 5000)")]
    pub port: Option<u16>,

    /// Base directory for saved XML files
    #[arg(
        short = 'd',
        long = "data-dir",
        help = "Directory for saved XML files (default SavedFiles)"
    )]
    pub data_dir: Option<PathBuf>,

    /// Origin allowed to call the API cross-origin
    #[arg(
        long = "origin",
        help = "Allowed CORS origin (default http://localhost:3000)"
    )]
    pub origin: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_required() {
        let cli = Cli::try_parse_from(["edit-xml"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_all_flags_parse() {
        let cli = Cli::try_parse_from([
            "edit-xml",
            "--config",
            "server.toml",
            "--bind",
            "0.0.0.0",
            "--port",
            "8080",
            "--data-dir",
            "/var/lib/edit-xml",
            "--origin",
            "http://localhost:5173",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("server.toml")));
        assert_eq!(cli.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/var/lib/edit-xml")));
        assert_eq!(cli.origin.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["edit-xml", "--port", "70000"]).is_err());
    }
}
