//! Semantic checker and reachability pass.
//!
//! [`checker::check_tree`] walks a [`lousyc_syntax::ParseTree`] on an
//! explicit stack and lowers it to a per-function CFG of three-address
//! [`ir::SemInst`]s over [`ir::Place`] ids. [`reachability::check_reachability`]
//! then prunes blocks the CFG can't reach and flags any that held real
//! statements (`spec.md` §4.3, §4.4).

pub mod checker;
pub mod error;
pub mod ir;
pub mod print;
pub mod reachability;

pub use checker::check_tree;
pub use error::{CheckError, ReachabilityError};
pub use ir::{BlockId, InstData, Place, PlaceData, SemBlock, SemFunc, SemInst, SemOp};
pub use print::print_sem_func;
pub use reachability::check_reachability;
