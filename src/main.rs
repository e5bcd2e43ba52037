use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use todo_icon_gen::icon_gen::{self, Options, DEFAULT_OUTPUT_DIR};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[clap(
    name = "todo-icon-gen",
    version,
    about = "Render the ToDoList app icon set into an Xcode appiconset"
)]
struct Args {
    /// Output directory, created if missing.
    #[clap(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Seed for the noise texture. A random seed is used when omitted.
    #[clap(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Also write the asset catalog Contents.json next to the icons
    #[clap(long)]
    contents_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Progress goes to stdout; diagnostics stay on stderr
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    icon_gen::generate_icons(&Options {
        output: args.output,
        seed: args.seed,
        contents_json: args.contents_json,
    })
}
