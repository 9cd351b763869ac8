use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use espstub::{
    config::StubLocation,
    encode_file,
    extract,
    logging::initialize_logger,
    Chip,
    Config,
};
use log::{debug, LevelFilter};
use miette::Result;

#[derive(Debug, Parser)]
#[clap(about, propagate_version = true, version)]
struct Cli {
    /// Enable debug output
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    subcommand: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write the STUB image of every supported chip
    Extract(ExtractArgs),
    /// Write the STUB image of a single stub description
    Encode(EncodeArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Directory containing the stub descriptions, takes precedence over
    /// the esptool and ESP-IDF paths
    #[clap(long)]
    stub_dir: Option<PathBuf>,
    /// Path to an esptool checkout
    #[clap(long, env = "ESPTOOL_PATH")]
    esptool_path: Option<PathBuf>,
    /// Path to an ESP-IDF tree
    #[clap(long, env = "IDF_PATH")]
    idf_path: Option<PathBuf>,
    /// Directory to write the images to
    #[clap(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Only extract the stubs of these chips
    #[clap(short, long, value_enum)]
    chip: Vec<Chip>,
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Stub description (esptool `.json` or espflash `.toml`)
    input: PathBuf,
    /// Chip the stub belongs to
    #[clap(short, long, value_enum)]
    chip: Chip,
    /// Path of the image to write, defaults to `<chip>_stub.bin`
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    miette::set_panic_hook();

    let cli = Cli::parse();
    initialize_logger(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    debug!("{:#?}", cli);

    match cli.subcommand {
        Commands::Extract(args) => extract_stubs(args),
        Commands::Encode(args) => encode_stub(args),
    }
}

fn extract_stubs(args: ExtractArgs) -> Result<()> {
    let location = StubLocation {
        stub_dir: args.stub_dir,
        esptool_path: args.esptool_path,
        idf_path: args.idf_path,
    };
    let config = Config::new(&location, args.output_dir, &args.chip)?;

    extract(&config)?;

    Ok(())
}

fn encode_stub(args: EncodeArgs) -> Result<()> {
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(args.chip.image_name()));

    encode_file(&args.input, args.chip, &output)?;

    Ok(())
}
