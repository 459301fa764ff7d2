use replica::{AccessError, CopyError};

/// Why the demonstration failed.
#[derive(Debug)]
pub enum DemoError {
    /// The source graph could not be built or read.
    Access(AccessError),

    /// The engine refused to copy the graph.
    Copy(CopyError),

    /// The copy differs from the source where it should not, or shares a
    /// node it should have duplicated.
    Mismatch(&'static str),
}

impl core::fmt::Display for DemoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DemoError::Access(err) => write!(f, "{err}"),
            DemoError::Copy(err) => write!(f, "deep copy failed: {err}"),
            DemoError::Mismatch(issue) => write!(f, "check failed: {issue}"),
        }
    }
}

impl core::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            DemoError::Access(err) => Some(err),
            DemoError::Copy(err) => Some(err),
            DemoError::Mismatch(_) => None,
        }
    }
}

impl From<AccessError> for DemoError {
    fn from(value: AccessError) -> Self {
        DemoError::Access(value)
    }
}

impl From<CopyError> for DemoError {
    fn from(value: CopyError) -> Self {
        DemoError::Copy(value)
    }
}

/// Fails with `issue` unless `condition` holds.
pub(crate) fn ensure(condition: bool, issue: &'static str) -> Result<(), DemoError> {
    if condition {
        Ok(())
    } else {
        Err(DemoError::Mismatch(issue))
    }
}
