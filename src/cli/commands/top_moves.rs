//! Top moves command - the best scoring moves in the store.

use structopt::StructOpt;
use uuid::Uuid;

use super::util::{or_exit, print_move_records, StoreArgs};
use super::Command;

#[derive(StructOpt)]
pub struct TopMovesArgs {
    #[structopt(flatten)]
    pub store: StoreArgs,
    #[structopt(long)]
    pub session: Option<Uuid>,
    #[structopt(short, long, default_value = "10")]
    pub limit: usize,
}

impl Command for TopMovesArgs {
    fn execute(self) {
        let records = or_exit(self.store.manager().top_moves(self.session, self.limit));
        print_move_records(&records);
    }
}
