//! Command-line arguments

use clap::Parser;
use guacamole_import_core::ImportSettings;
use std::path::PathBuf;

/// Import connections from a CSV file into Apache Guacamole
#[derive(Parser, Debug)]
#[command(name = "guac-import")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CSV file with columns site,device_name,hostname,protocol,port,username,password
    pub csv_file: PathBuf,

    /// Base URL of the Guacamole API (e.g. http://localhost:8080/guacamole/api)
    #[arg(short = 'u', long = "url", env = "GUACAMOLE_API_URL")]
    pub api_url: Option<String>,

    /// Guacamole admin username
    #[arg(short = 'n', long, env = "GUACAMOLE_USERNAME")]
    pub username: Option<String>,

    /// Guacamole admin password
    #[arg(short, long, env = "GUACAMOLE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Group chain every imported site is placed under
    #[arg(short = 'g', long, env = "GUACAMOLE_PARENT_GROUP")]
    pub parent_group: Option<String>,

    /// Data source to import into instead of the one returned at login
    #[arg(long, env = "GUACAMOLE_DATA_SOURCE")]
    pub data_source: Option<String>,

    /// Name the root group is addressed by in site paths
    #[arg(long)]
    pub root_name: Option<String>,

    /// JSON settings file (defaults to ~/.guacamole-import/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the resulting hierarchy after the import
    #[arg(long)]
    pub print_tree: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings given on the command line or through the environment
    pub fn settings(&self) -> ImportSettings {
        ImportSettings {
            api_url: self.api_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            data_source: self.data_source.clone(),
            parent_group: self.parent_group.clone(),
            root_name: self.root_name.clone(),
            timeout_secs: self.timeout,
            ..Default::default()
        }
    }
}
