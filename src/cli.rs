use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::schedule::Language;

#[derive(Parser, Debug)]
#[command(
    name = "rosterscan",
    version,
    about = "Vacancy and assignment lookup over interpreter roster worksheets"
)]
pub struct Cli {
    /// Layout JSON replacing the built-in section table.
    #[arg(long, global = true)]
    pub layout: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Snapshot(SnapshotArgs),
    Status(StatusArgs),
    Layout(LayoutArgs),
    Lookup(LookupArgs),
    Vacancy(VacancyArgs),
    Detail(DetailArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    #[arg(long, default_value = ".cache/rosterscan")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/rosterscan")]
    pub cache_root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    #[arg(long, default_value = ".cache/rosterscan")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VacancyArgs {
    #[arg(long, default_value = ".cache/rosterscan")]
    pub cache_root: PathBuf,

    #[arg(long, value_enum)]
    pub language: Language,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DetailArgs {
    #[arg(long, default_value = ".cache/rosterscan")]
    pub cache_root: PathBuf,

    /// ISO date (2025-07-18) or the sheet label (7/18(금)).
    #[arg(long)]
    pub date: String,

    #[arg(long)]
    pub document: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
