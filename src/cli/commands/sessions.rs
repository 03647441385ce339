//! Sessions command - list recorded sessions.

use azul_analysis::session::SessionProgress;
use structopt::StructOpt;

use super::util::{or_exit, print_progress, StoreArgs};
use super::Command;

#[derive(StructOpt)]
pub struct SessionsArgs {
    #[structopt(flatten)]
    pub store: StoreArgs,
}

impl Command for SessionsArgs {
    fn execute(self) {
        let sessions = or_exit(self.store.manager().list());
        if sessions.is_empty() {
            println!("No sessions recorded.");
        }
        for session in &sessions {
            print_progress(&SessionProgress::of(session));
        }
    }
}
