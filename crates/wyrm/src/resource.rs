use std::fmt;

use crate::error::RunError;

/// Maximum recursion depth when coercing nested host data structures.
///
/// Host arrays and maps are converted recursively; this bounds the depth so
/// pathological inputs fail cleanly instead of overflowing the stack.
pub const MAX_DATA_RECURSION_DEPTH: usize = 100;

/// Default maximum interpreter call depth for [`LimitedTracker`].
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1000;

/// Error returned when a resource limit is exceeded during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Maximum number of heap allocations exceeded.
    Allocation {
        /// The configured allocation limit.
        limit: usize,
        /// The allocation count that breached it.
        count: usize,
    },
    /// Maximum call or data recursion depth exceeded.
    Recursion {
        /// The configured depth limit.
        limit: usize,
        /// The depth that breached it.
        depth: usize,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { limit, count } => {
                write!(f, "allocation limit exceeded: {count} > {limit}")
            }
            Self::Recursion { limit, depth } => {
                write!(f, "maximum recursion depth exceeded: {depth} > {limit}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

impl From<ResourceError> for RunError {
    /// Resource breaches surface as `NotSupported`: the runtime refuses to
    /// provide capability beyond its configured limits.
    fn from(err: ResourceError) -> Self {
        Self::not_supported(err.to_string())
    }
}

/// Trait for tracking resource usage.
///
/// Monomorphized through the runtime's type parameter so the no-limit
/// implementation compiles away entirely.
pub trait ResourceTracker: fmt::Debug {
    /// Called before each heap allocation.
    fn on_allocate(&mut self) -> Result<(), ResourceError>;

    /// Called when entering a nested call or a nested coercion level.
    fn check_depth(&self, depth: usize) -> Result<(), ResourceError>;

    /// Returns the allocation count so far, if this tracker counts.
    fn allocations(&self) -> Option<usize> {
        None
    }
}

/// Tracker that enforces no limits. The default for embedding hosts that
/// trust their inputs; all checks compile to no-ops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoLimitTracker;

impl ResourceTracker for NoLimitTracker {
    #[inline]
    fn on_allocate(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }

    #[inline]
    fn check_depth(&self, _depth: usize) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// Tracker that enforces an allocation budget and a recursion-depth cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedTracker {
    max_allocations: usize,
    max_depth: usize,
    allocations: usize,
}

impl LimitedTracker {
    /// Creates a tracker with the given allocation and depth limits.
    #[must_use]
    pub fn new(max_allocations: usize, max_depth: usize) -> Self {
        Self {
            max_allocations,
            max_depth,
            allocations: 0,
        }
    }
}

impl ResourceTracker for LimitedTracker {
    fn on_allocate(&mut self) -> Result<(), ResourceError> {
        self.allocations += 1;
        if self.allocations > self.max_allocations {
            return Err(ResourceError::Allocation {
                limit: self.max_allocations,
                count: self.allocations,
            });
        }
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> Result<(), ResourceError> {
        if depth > self.max_depth {
            return Err(ResourceError::Recursion {
                limit: self.max_depth,
                depth,
            });
        }
        Ok(())
    }

    fn allocations(&self) -> Option<usize> {
        Some(self.allocations)
    }
}
