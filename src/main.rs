use clap::Parser;
use palaver::ThemeKind;
use palaver::core::config;
use palaver::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "palaver", about = "Terminal front end for an AI agent")]
struct Args {
    /// Visual theme
    #[arg(short, long, value_enum)]
    theme: Option<ThemeKind>,

    /// Agent endpoint base URL (e.g. http://localhost:8000)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Ask the agent for one complete reply instead of a stream
    #[arg(long)]
    no_stream: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to palaver.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("palaver.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("palaver: {e}");
            std::process::exit(1);
        }
    };
    let resolved = config::resolve(
        &file_config,
        args.theme,
        args.endpoint.as_deref(),
        args.no_stream,
    );

    log::info!(
        "Palaver starting up (agent: {}, theme: {:?})",
        resolved.base_url,
        resolved.theme
    );

    tui::run(resolved)
}
