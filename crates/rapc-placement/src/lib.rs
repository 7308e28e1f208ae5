//! rapc-placement — resource-aware executor placement.
//!
//! Maps a topology's unassigned executors onto cluster worker slots,
//! honoring per-executor CPU and memory demands, a per-worker heap cap,
//! and a preference for keeping a topology's work rack-local. One call
//! to [`compute_placement`] produces either a full assignment or a
//! structured failure naming what could not be placed.
//!
//! # Components
//!
//! - **`walker`** — breadth-first partial order over topology components
//! - **`interleave`** — round-robin executor stream across component ranks
//! - **`scorer`** — node ranking by resource pressure + network distance
//! - **`selector`** — first free slot that passes the heap-budget check
//! - **`placer`** — rack anchoring, reference-node drift, the full run
//!
//! The engine is strictly single-threaded per call, takes exclusive
//! ownership of the cluster snapshot, and is deterministic: identical
//! inputs produce byte-identical assignments.

pub mod error;
pub mod interleave;
pub mod placer;
pub mod result;
pub mod scorer;
pub mod selector;
pub mod walker;

pub use error::{PlacementError, PlacementResult};
pub use placer::{best_rack, compute_placement};
pub use result::{SchedulingResult, SchedulingStatus};
pub use scorer::{rank_nodes, topo_dist, RankedNode, ScoringWeights};
pub use selector::find_slot;
pub use walker::{bfs_order, source_components};
