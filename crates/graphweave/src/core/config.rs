//! Parser configuration

/// Default bound on group/subgraph nesting
pub const DEFAULT_MAX_NESTING: usize = 64;

/// Settings shared by every parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Deepest group/subgraph nesting accepted before the parse fails
    pub max_nesting: usize,
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}
