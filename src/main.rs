use clap::Parser;
use geowalk::app;
use geowalk::core::config;
use geowalk::locate::Startpoint;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(
    name = "geowalk",
    about = "Walk a virtual device's GPS fix around with the keyboard"
)]
struct Args {
    /// Start from an explicit latitude/longitude pair
    #[arg(
        short = 'p',
        long = "position",
        num_args = 2,
        value_names = ["LAT", "LON"],
        allow_negative_numbers = true,
        // A repeated -p replaces the earlier pair instead of appending to
        // it, so a parsed value always holds exactly two numbers.
        action = clap::ArgAction::Set,
        overrides_with = "position",
        conflicts_with = "resume"
    )]
    position: Option<Vec<f64>>,

    /// Resume from the last position written to the cache file
    #[arg(short = 'r', long = "resume")]
    resume: bool,

    /// Shell binary to drive (overrides config and GEOWALK_SHELL)
    #[arg(long)]
    shell: Option<String>,
}

impl Args {
    fn startpoint(&self) -> Startpoint {
        match (self.position.as_deref(), self.resume) {
            (Some(&[latitude, longitude]), _) => Startpoint::Explicit {
                latitude,
                longitude,
            },
            (Some(_), _) => unreachable!("clap enforces exactly two values"),
            (None, true) => Startpoint::Resume,
            (None, false) => Startpoint::Lookup,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // File logger; stdout stays free for the walk itself.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("geowalk.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("geowalk starting up");

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("fatal: {e}");
            eprintln!("geowalk: {e}");
            std::process::exit(1);
        }
    };
    let resolved = config::resolve(&file_config, args.shell.as_deref());

    if let Err(e) = app::run(resolved, args.startpoint()).await {
        log::error!("fatal: {e}");
        eprintln!("geowalk: {e}");
        std::process::exit(1);
    }
}
