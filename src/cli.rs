use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML config file
    #[clap(short, long, default_value = "postview.yaml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start postview as a service.
    Daemon {
        /// Override the configured bind address
        #[clap(short, long)]
        bind: Option<String>,
    },

    /// Extract a single post and print the content record.
    Extract {
        /// a post url
        url: String,

        /// Skip the external media-info tool tier
        #[clap(long, default_value = "false")]
        no_primary: bool,

        /// Skip the headless-browser tier
        #[clap(long, default_value = "false")]
        no_secondary: bool,
    },
}
