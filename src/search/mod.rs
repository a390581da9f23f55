//! Search engine for the arrocco chess engine

pub mod params;
pub mod search;
pub mod stats;
pub mod thread_mgr;
pub mod tt;

pub use self::params::SearchParams;
pub use self::search::{Search, DRAW, INFINITE, MATE, MATE_BOUND, MAX_PLY};
pub use self::stats::{SearchInfo, SearchStats};
pub use self::thread_mgr::{SearchEvent, SearchJob, ThreadManager};
pub use self::tt::TranspositionTable;
