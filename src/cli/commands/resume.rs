//! Resume command - continue a stopped or failed session.

use structopt::StructOpt;
use uuid::Uuid;

use super::util::{follow, or_exit, StoreArgs};
use super::Command;

#[derive(StructOpt)]
pub struct ResumeArgs {
    #[structopt(flatten)]
    pub store: StoreArgs,
    pub session: Uuid,
}

impl Command for ResumeArgs {
    fn execute(self) {
        let manager = self.store.manager();
        let progress = or_exit(manager.resume(self.session, None));
        println!(
            "Resumed session {} at {} positions",
            progress.id,
            progress.positions_analyzed + progress.positions_failed
        );
        follow(&manager, progress.id);
    }
}
