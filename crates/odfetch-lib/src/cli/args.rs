use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone)]
pub enum Command {
    Url {
        config_path: Option<String>,
        url: String,
        download: DownloadFlags,
    },
    File {
        config_path: Option<String>,
        descriptor_path: String,
        download: DownloadFlags,
    },
}

/// Download tuning shared by both subcommands. Unset values fall back to the config file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DownloadFlags {
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        help = "Directory the parts and metadata are written to (default: .)"
    )]
    pub output_dir: Option<String>,

    #[arg(
        short = 'i',
        long = "rate-interval",
        value_name = "DURATION",
        help = "Minimum time between requests, e.g. 2s or 500ms (default: 2s)"
    )]
    pub rate_interval: Option<String>,

    #[arg(
        short = 'r',
        long = "retry-count",
        value_name = "N",
        help = "How often a part that returns no content is retried (default: 3)"
    )]
    pub retry_count: Option<usize>,

    #[arg(
        long = "request-timeout",
        value_name = "DURATION",
        help = "Timeout for a single HTTP request (default: 5m)"
    )]
    pub request_timeout: Option<String>,

    #[arg(
        long = "strict",
        help = "Exit with an error if any part could not be downloaded after retrying"
    )]
    pub strict: bool,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "odfetch",
    version,
    about = "Download the parts of a borrowed ebook or audiobook"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file with download defaults",
        global = true
    )]
    config: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Scrape the parts list from a web reader page and download every part
    Url {
        #[arg(short = 'u', long = "url", value_name = "URL", help = "Reader page URL")]
        url: String,

        #[command(flatten)]
        download: DownloadFlags,
    },

    /// Acquire a license for a media descriptor (.odm) and download every part
    File {
        #[arg(
            short = 'f',
            long = "file",
            value_name = "FILE",
            help = "Media descriptor (.odm) file"
        )]
        file: String,

        #[command(flatten)]
        download: DownloadFlags,
    },
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("html5ever=warn".parse().unwrap()),
        )
        .init();

    let command = match cli.command {
        CliCommand::Url { url, download } => Command::Url {
            config_path: cli.config,
            url,
            download,
        },
        CliCommand::File { file, download } => Command::File {
            config_path: cli.config,
            descriptor_path: file,
            download,
        },
    };

    Args { command, log_level }
}
