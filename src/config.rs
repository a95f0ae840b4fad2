use crate::table::TableConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Open and close MIDI ports from the terminal.
#[derive(Parser, Debug)]
#[command(name = "mports", version, about)]
pub struct Cli {
    /// Print the current ports as JSON and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Milliseconds between port scans (0 disables scanning)
    #[arg(long, default_value_t = 1000, env = "MPORTS_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Client name registered with the MIDI subsystem
    #[arg(long, default_value = "mports", env = "MPORTS_CLIENT_NAME")]
    pub client_name: String,

    /// Log file path. Logs never go to the terminal.
    #[arg(long, default_value = "/tmp/mports.log", env = "MPORTS_LOG_FILE")]
    pub log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub list_ports: bool,
    pub client_name: String,
    pub poll_interval: Option<Duration>,
    pub log_file: PathBuf,
    pub log_level: &'static str,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let poll_interval = match cli.poll_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        let log_level = match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        Self {
            list_ports: cli.list_ports,
            client_name: cli.client_name,
            poll_interval,
            log_file: cli.log_file,
            log_level,
        }
    }
}

impl Config {
    pub fn table_config(&self) -> TableConfig {
        TableConfig {
            poll_interval: self.poll_interval,
        }
    }
}
