use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "sqlcraft")]
#[command(about = "parses, formats, and inspects SQL through the sqlcraft pipeline", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(name = "parse", about = "parse a SQL file and report success or a parse error")]
    Parse(ParseArgs),
    #[command(name = "format", about = "parse a SQL file and print it back out through the formatter")]
    Format(FormatArgs),
    #[command(name = "cte", about = "report the CTE dependency graph of a SQL file")]
    Cte(CteArgs),
}

#[derive(Debug, Clone, Copy, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PresetArg {
    Generic,
    Postgres,
}

#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// path to a file containing one SQL statement
    pub file_path: String,
}

#[derive(Debug, Parser)]
pub struct FormatArgs {
    /// path to a file containing one SQL statement
    pub file_path: String,
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,
}

#[derive(Debug, Parser)]
pub struct CteArgs {
    /// path to a file containing one SQL statement
    pub file_path: String,
}
