//! Search parameters and configuration
//!
//! Budgets for one `think` call. `Search::think` overrides depth, time and
//! the infinite flag per call; the node limit is read from here.

/// Deepest iteration the driver will ever start
pub const MAX_DEPTH: u8 = 64;

/// Search parameters for the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Maximum search depth in plies
    pub max_depth: u8,

    /// Time limit in milliseconds (0 = unlimited)
    pub time_limit_ms: u64,

    /// Node limit (0 = unlimited)
    pub node_limit: u64,

    /// Ignore the time limit until stopped from outside
    pub infinite: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_depth: 8,
            time_limit_ms: 5000,
            node_limit: 0,
            infinite: false,
        }
    }
}

impl SearchParams {
    /// Create new search params with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum depth in plies, clamped to `1..=MAX_DEPTH`
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth.clamp(1, MAX_DEPTH);
        self
    }

    /// Set time limit in milliseconds
    pub fn time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Set node limit
    pub fn node_limit(mut self, limit: u64) -> Self {
        self.node_limit = limit;
        self
    }

    pub fn infinite(mut self, infinite: bool) -> Self {
        self.infinite = infinite;
        self
    }

    /// Whether the clock can end this search
    pub fn has_time_limit(&self) -> bool {
        !self.infinite && self.time_limit_ms > 0
    }
}
