//! CLI argument parsing using StructOpt.

use structopt::StructOpt;

use crate::cli::commands::{
    analyze::AnalyzeArgs, delete::DeleteArgs, resume::ResumeArgs, run::RunArgs,
    sessions::SessionsArgs, show::ShowArgs, top_moves::TopMovesArgs,
};

#[derive(StructOpt)]
#[structopt(
    name = "azul-analysis",
    about = "Scores every legal move of Azul positions with a panel of evaluation engines"
)]
pub enum AzulAnalysis {
    #[structopt(
        name = "analyze",
        about = "Analyze a single position, given in canonical notation with `--position`, and print its moves ranked by quality. The phase is classified from the position unless `--phase` is given."
    )]
    Analyze(AnalyzeArgs),
    #[structopt(
        name = "run",
        about = "Start a batch session over `--target` positions (default: 100) and follow it to the end. Positions come from `--positions-file` (one per line) or, without one, from seeded random play."
    )]
    Run(RunArgs),
    #[structopt(
        name = "resume",
        about = "Resume a stopped or failed session from the store, skipping the positions it already consumed."
    )]
    Resume(ResumeArgs),
    #[structopt(name = "sessions", about = "List the sessions recorded in the store.")]
    Sessions(SessionsArgs),
    #[structopt(
        name = "show",
        about = "Show a session's summary: counters, tier distribution, engine outcomes and its best moves."
    )]
    Show(ShowArgs),
    #[structopt(
        name = "delete",
        about = "Delete a session and every result recorded under it."
    )]
    Delete(DeleteArgs),
    #[structopt(
        name = "top-moves",
        about = "List the highest scoring moves, across the whole store or within one `--session`."
    )]
    TopMoves(TopMovesArgs),
}

impl crate::cli::commands::Command for AzulAnalysis {
    fn execute(self) {
        macro_rules! execute_command {
            ($($variant:ident($cmd:ident)),+ $(,)?) => {
                match self {
                    $(Self::$variant($cmd) => $cmd.execute(),)+
                }
            };
        }

        execute_command! {
            Analyze(cmd),
            Run(cmd),
            Resume(cmd),
            Sessions(cmd),
            Show(cmd),
            Delete(cmd),
            TopMoves(cmd),
        }
    }
}
