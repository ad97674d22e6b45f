use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sqlite-webgui",
    about = "Browse and edit a SQLite database from the browser",
    after_help = "Examples:\n  sqlite-webgui mydata.db                  # read-only mode (safe)\n  sqlite-webgui --writable mydata.db       # enable write operations\n  sqlite-webgui --port 3000 mydata.db      # custom port, read-only"
)]
pub struct Args {
    /// Path to an existing SQLite database file.
    #[arg(value_parser = existing_file)]
    pub database: PathBuf,

    /// Port to run the server on.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Enable write operations (default: read-only mode).
    #[arg(long)]
    pub writable: bool,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// SQLite busy timeout for the shared connection.
    #[arg(long, default_value_t = 2_000)]
    pub busy_timeout_ms: u64,
}

impl Args {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "127.0.0.1" => "localhost",
            other => other,
        };
        format!("http://{host}:{}", self.port)
    }
}

// The database is never created by this tool, so a missing file is a usage error.
fn existing_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("database file does not exist: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_argument_is_rejected() {
        let err = Args::try_parse_from(["sqlite-webgui"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn nonexistent_database_is_rejected() {
        let err = Args::try_parse_from(["sqlite-webgui", "/definitely/not/here.db"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn defaults_are_read_only_on_8080() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = Args::try_parse_from(["sqlite-webgui", file.path().to_str().unwrap()]).unwrap();
        assert!(!args.writable);
        assert_eq!(args.port, 8080);
        assert_eq!(args.addr(), "127.0.0.1:8080");
        assert_eq!(args.url(), "http://localhost:8080");
    }

    #[test]
    fn writable_and_port_flags() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = Args::try_parse_from([
            "sqlite-webgui",
            "--writable",
            "--port",
            "3000",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(args.writable);
        assert_eq!(args.port, 3000);
    }

    #[test]
    fn unknown_flags_are_usage_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = Args::try_parse_from(["sqlite-webgui", "--open", file.path().to_str().unwrap()])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
