//! Run command - start a batch session and follow it.

use std::path::PathBuf;

use azul_analysis::session::{SessionRequest, SourceSpec};
use structopt::StructOpt;

use super::util::{follow, or_exit, ConfigArgs, StoreArgs};
use super::Command;

#[derive(StructOpt)]
pub struct RunArgs {
    #[structopt(flatten)]
    pub store: StoreArgs,
    #[structopt(flatten)]
    pub config: ConfigArgs,
    #[structopt(long, parse(from_os_str))]
    pub positions_file: Option<PathBuf>,
    #[structopt(short, long, default_value = "100")]
    pub target: u64,
    /// Players per random game.
    #[structopt(long, default_value = "2")]
    pub players: usize,
    /// Random plies played from each new game before it is analyzed.
    #[structopt(long, default_value = "40")]
    pub max_plies: u32,
}

impl Command for RunArgs {
    fn execute(self) {
        let config = or_exit(self.config.load());
        let manager = self.store.manager();
        let spec = match self.positions_file {
            Some(path) => SourceSpec::File { path },
            None => SourceSpec::Random {
                seed: config.seed,
                player_count: self.players,
                max_plies: self.max_plies,
            },
        };
        let request = or_exit(SessionRequest::from_spec(config, spec, self.target));
        let progress = or_exit(manager.start(request));
        println!("Started session {}", progress.id);
        follow(&manager, progress.id);
    }
}
