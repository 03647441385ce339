mod cli;

use env_logger::Env;
use structopt::StructOpt;

use crate::cli::commands::Command;
use crate::cli::AzulAnalysis;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    AzulAnalysis::from_args().execute();
}
