use clap::{CommandFactory, Parser};
use packwiz_util::config::{Config, Options};
use packwiz_util::digest::DEFAULT_MIN_SIZE;
use packwiz_util::error::exit_code;
use std::path::PathBuf;
use std::process::ExitCode;

/// packwiz-util - find pack files on CurseForge and Modrinth
///
/// Replaces raw files in a packwiz pack with metadata records, caches
/// CurseForge download URLs and links records to Modrinth.
///
/// The CurseForge API key may also be given through CF_API_KEY, the
/// Modrinth token through MODRINTH_API_KEY.
///
/// Examples:
///   packwiz-util --cf-detect --cf-url     # Convert CurseForge files and cache their URLs
///   packwiz-util --mr-merge               # Link existing records to Modrinth
#[derive(Parser, Debug)]
#[command(author, version = env!("PACKWIZ_UTIL_VERSION"), about)]
struct Cli {
    /// Replace raw files found on CurseForge with provisional metadata
    #[arg(long)]
    cf_detect: bool,

    /// Cache direct download URLs for provisional CurseForge metadata
    #[arg(long)]
    cf_url: bool,

    /// Replace raw files found on Modrinth with metadata
    #[arg(long)]
    mr_detect: bool,

    /// Link existing metadata to Modrinth and set its side
    #[arg(long)]
    mr_merge: bool,

    /// Path to pack.toml
    #[arg(long = "pack", value_name = "PATH", default_value = "pack.toml")]
    pack_file: PathBuf,

    /// CurseForge API key
    #[arg(long, value_name = "KEY")]
    cf_api_key: Option<String>,

    /// Modrinth API token
    #[arg(long, value_name = "TOKEN")]
    mr_api_key: Option<String>,

    /// Files smaller than this many bytes are never looked up
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MIN_SIZE)]
    min_size: u64,

    /// Number of files digested at once (defaults to available parallelism)
    #[arg(long, short = 'j', value_name = "N")]
    jobs: Option<usize>,

    /// packwiz executable
    #[arg(long, env = "PACKWIZ", value_name = "PROGRAM", default_value = "packwiz")]
    packwiz: String,

    /// CurseForge API URL (defaults to https://api.curseforge.com/v1)
    #[arg(long, value_name = "URL")]
    cf_api_url: Option<String>,

    /// Modrinth API URL (defaults to https://api.modrinth.com/v2)
    #[arg(long, value_name = "URL")]
    mr_api_url: Option<String>,

    /// Write .pw.toml files directly instead of running packwiz add
    #[arg(long)]
    write_metadata: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    fn into_options(self) -> Options {
        Options {
            pack_file: self.pack_file,
            cf_detect: self.cf_detect,
            cf_url: self.cf_url,
            mr_detect: self.mr_detect,
            mr_merge: self.mr_merge,
            cf_api_key: self.cf_api_key,
            mr_api_key: self.mr_api_key,
            cf_api_url: self.cf_api_url,
            mr_api_url: self.mr_api_url,
            min_size: self.min_size,
            jobs: self.jobs.map(|jobs| jobs.max(1)),
            packwiz: self.packwiz,
            write_metadata: self.write_metadata,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    let options = cli.into_options();
    if !options.any_mode() {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    }

    let runtime = packwiz_util::runtime::RealRuntime;
    let result = match Config::new(runtime, options) {
        Ok(config) => packwiz_util::app::run(config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            let code = u8::try_from(exit_code(&err))
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
