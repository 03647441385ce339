//! Show command - print a session's summary.

use structopt::StructOpt;
use uuid::Uuid;

use super::util::{or_exit, print_summary, StoreArgs};
use super::Command;

#[derive(StructOpt)]
pub struct ShowArgs {
    #[structopt(flatten)]
    pub store: StoreArgs,
    pub session: Uuid,
    #[structopt(long)]
    pub json: bool,
}

impl Command for ShowArgs {
    fn execute(self) {
        let summary = or_exit(self.store.manager().summary(self.session));
        if self.json {
            println!("{}", or_exit(serde_json::to_string_pretty(&summary)));
        } else {
            print_summary(&summary);
        }
    }
}
