use clap::Parser;
use std::path::PathBuf;

use crate::options::MonitorOptions;

#[derive(Parser, Debug)]
#[command(
    name = "evmon",
    about = "Monitor a local or remote event feed",
    version = env!("GIT_DESCRIBE"),
    long_about = "Monitor a local or remote event feed\n\nBy default the monitor will listen to all event types.",
    after_help = "Examples:\n  evmon --type=logging\n      Only show log messages.\n\n  evmon --pretty --type=logging --loglevel=info\n      Show a pretty log of messages with info level or higher.\n\n  evmon lab: --type=lifecycle --all-projects\n      Only show lifecycle events from every project on the \"lab\" remote.\n\nLogs are written to: ~/.local/share/evmon/logs/evmon.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to evmon.yaml config file")]
    pub config: Option<PathBuf>,

    /// Remote to monitor, as `<remote>` or `<remote>:` (defaults to the configured default remote)
    #[arg(value_name = "REMOTE")]
    pub target: Option<String>,

    /// Event type to listen for (repeatable)
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<String>,

    /// Pretty rendering (short for --format=pretty)
    #[arg(long)]
    pub pretty: bool,

    /// Minimum level for log messages (only available when using pretty format)
    #[arg(long, value_name = "LEVEL")]
    pub loglevel: Option<String>,

    /// Show events from all projects
    #[arg(long)]
    pub all_projects: bool,

    /// Format (json|pretty|yaml)
    #[arg(short, long, default_value = "yaml")]
    pub format: String,
}

impl Cli {
    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            format: self.format.clone(),
            pretty: self.pretty,
            loglevel: self.loglevel.clone(),
            types: self.types.clone(),
            all_projects: self.all_projects,
        }
    }
}
