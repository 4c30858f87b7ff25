//! Parse configuration
//!
//! Verbosity travels with each parse instead of living in process-wide state:
//! records above `log_level` are never handed to the `log` facade.

use log::{Level, LevelFilter};

/// Default bound on element nesting (recursion depth of the parser)
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default `log` target for parser records
pub const DEFAULT_LOG_TARGET: &str = "insitu_xml";

/// Options controlling one parse
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Fail the whole parse on the first recoverable anomaly
    pub strict: bool,
    /// Maximum element nesting depth (the root element is depth 1)
    pub max_depth: usize,
    /// Maximum number of elements, `None` for unbounded
    pub max_nodes: Option<usize>,
    /// Most verbose level this parse may emit
    pub log_level: LevelFilter,
    /// Target passed to the `log` facade
    pub log_target: &'static str,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: None,
            log_level: LevelFilter::Error,
            log_target: DEFAULT_LOG_TARGET,
        }
    }
}

impl ParseOptions {
    /// Lenient defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict mode with otherwise default settings
    pub fn strict() -> Self {
        Self::default().with_strict(true)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_log_target(mut self, target: &'static str) -> Self {
        self.log_target = target;
        self
    }

    /// Whether a record at `level` passes this parse's filter
    #[inline]
    pub fn logs(&self, level: Level) -> bool {
        level <= self.log_level
    }
}
