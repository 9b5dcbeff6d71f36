//! The Spindle sea-of-nodes IR: graph primitives and use-chains
//! ([`graph`]), GraphViz emission ([`dot`]), the SemFunc → Spindle builder
//! ([`builder::lower_sem_func`]), and the dead-store/peephole optimizer
//! ([`opt::sb_opt`]) (`spec.md` §4.5-§4.7).

pub mod builder;
pub mod dot;
pub mod graph;
pub mod opt;

pub use builder::lower_sem_func;
pub use dot::write_graphviz;
pub use graph::{NodeFlags, NodeId, NodeKind, SbFunc, SbNode};
pub use opt::sb_opt;
