use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dge-report",
    version,
    about = "Static HTML reports for RNA-seq pipeline metrics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Run(RunArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory holding versions.json, summary.json and the per-module
    /// metrics blobs emitted by the pipeline
    pub data_dir: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = num_cpus::get())]
    pub threads: usize,

    #[arg(long, default_value_t = false)]
    pub no_zip: bool,

    /// Only render pages for these modules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub modules: Option<Vec<String>>,
}
