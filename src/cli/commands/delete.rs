//! Delete command - remove a session and its results.

use structopt::StructOpt;
use uuid::Uuid;

use super::util::{or_exit, StoreArgs};
use super::Command;

#[derive(StructOpt)]
pub struct DeleteArgs {
    #[structopt(flatten)]
    pub store: StoreArgs,
    pub session: Uuid,
}

impl Command for DeleteArgs {
    fn execute(self) {
        or_exit(self.store.manager().delete(self.session));
        println!("Deleted session {}", self.session);
    }
}
