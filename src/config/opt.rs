use clap::Parser;

/// Command-line options
#[derive(Debug, Default, Parser)]
#[command(name = "rxscreen", version, about = "Reactive pipeline demo screen")]
pub struct Opt {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    pub conf: Option<String>,

    /// Override the primary fetch URL
    #[arg(long)]
    pub primary: Option<String>,

    /// Override the secondary fetch URL
    #[arg(long)]
    pub secondary: Option<String>,

    /// Log everything, including subscription lifecycle
    #[arg(short, long)]
    pub verbose: bool,
}
