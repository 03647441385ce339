#[allow(clippy::module_inception)]
pub mod azul_move;
pub mod enumerator;
pub mod move_orderer;


pub use azul_move::{AzulMove, Destination, Source, Take};
pub use enumerator::{EnumeratorConfig, MoveEnumerator};
pub use move_orderer::{HeuristicMoveOrderer, MoveOrderer, NoOpMoveOrderer};
