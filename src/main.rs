use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use gitshelf::backend::DirectorySource;
use gitshelf::core::access::{AccessLevel, ConfigAccessPolicy, PublicKey};
use gitshelf::core::config::{CliOverrides, load_config, resolve};
use gitshelf::tui::app::{App, Outcome};
use gitshelf::tui::common::Common;
use gitshelf::tui::keymap::KeyMap;
use gitshelf::tui::selection::{Loader, Selection};
use gitshelf::tui::styles::Styles;

#[derive(Parser)]
#[command(name = "gitshelf", about = "Browse the repositories on a git server")]
struct Args {
    /// Config file (default: ~/.gitshelf/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the repositories
    #[arg(short, long)]
    repos: Option<PathBuf>,

    /// Host shown in clone commands
    #[arg(long)]
    host: Option<String>,

    /// Port shown in clone commands
    #[arg(short, long)]
    port: Option<u16>,

    /// Browse as this SSH public key (key line or path to a .pub file)
    #[arg(short, long)]
    key: Option<String>,

    /// Access level for visitors without a known key
    #[arg(long)]
    anon_access: Option<AccessLevel>,

    /// Where to write the debug log
    #[arg(long, default_value = "gitshelf.log")]
    log_file: PathBuf,
}

/// Accept either an authorized-keys line or a path to a file holding one.
fn requester_key(arg: &str) -> Option<PublicKey> {
    if let Some(key) = PublicKey::parse(arg) {
        return Some(key);
    }
    match fs::read_to_string(Path::new(arg)) {
        Ok(contents) => contents.lines().find_map(PublicKey::parse),
        Err(e) => {
            warn!("Could not read key file {}: {}", arg, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    info!("Gitshelf starting up");

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("gitshelf: {e}");
            return ExitCode::FAILURE;
        }
    };
    let overrides = CliOverrides {
        host: args.host,
        port: args.port,
        repos_path: args.repos,
        anon_access: args.anon_access,
    };
    let resolved = resolve(&config, &overrides);
    info!(
        "Serving {} from {} as {}",
        resolved.name,
        resolved.repos_path.display(),
        resolved.endpoint().clone_hint("<repo>")
    );

    let requester = match args.key.as_deref() {
        Some(arg) => match requester_key(arg) {
            Some(key) => Some(key),
            None => {
                eprintln!("gitshelf: not an SSH public key: {arg}");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };
    match &requester {
        Some(key) => info!("Browsing as {}", key.short()),
        None => info!("Browsing anonymously"),
    }

    let loader = Loader {
        source: Arc::new(DirectorySource::from_config(&resolved)),
        policy: Arc::new(ConfigAccessPolicy::from_config(&resolved)),
        endpoint: resolved.endpoint(),
        requester,
    };
    let common = Common::new(
        Arc::new(Styles::with_heights(
            resolved.selector_height,
            resolved.readme_height,
        )),
        Arc::new(KeyMap::default()),
    );
    let selection = Selection::new(common.clone(), loader);
    let app = App::new(common, resolved.name.clone(), selection, resolved.full_help);

    match gitshelf::tui::run(app) {
        Ok(Outcome::Chosen { identity, hint }) => {
            info!("Chose {}", identity);
            println!("{hint}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Quit) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Terminal error: {}", e);
            eprintln!("gitshelf: {e}");
            ExitCode::FAILURE
        }
    }
}
