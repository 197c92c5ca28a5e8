use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "modeler-import")]
#[command(about = "Import BPMN, CMMN and DMN definitions into a model store")]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory of the file model store")]
    pub store_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Author recorded on stored models")]
    pub user: Option<String>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import a process definition (.bpmn, .bpmn20.xml)
    Process {
        file: PathBuf,
        #[arg(long, help = "Store as a new version of the existing model")]
        new_version: bool,
    },
    /// Import a case definition (.cmmn, .cmmn.xml)
    Case { file: PathBuf },
    /// Import a decision service and its decision tables (.dmn, .dmn.xml)
    DecisionService { file: PathBuf },
    /// Import any supported definition, picked by file extension
    Import { file: PathBuf },
    /// Print the stored representation of a model
    Show { id: String },
    /// List the superseded versions of a model
    History { id: String },
}
