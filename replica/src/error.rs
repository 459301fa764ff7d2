use replica_core::{AccessError, BoxError, Shape};

/// Why no blank instance of a type could be obtained.
#[derive(Debug)]
pub enum ConstructionFailure {
    /// The type has neither an instance supplier nor a constructor.
    Unconstructible,

    /// The supplier or constructor produced an instance of another type.
    WrongShape {
        /// Shape of what was produced
        produced: &'static Shape,
    },

    /// The constructor failed.
    Raised(BoxError),
}

impl core::fmt::Display for ConstructionFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConstructionFailure::Unconstructible => {
                write!(f, "no instance supplier or constructor is registered")
            }
            ConstructionFailure::WrongShape { produced } => {
                write!(f, "an instance of {produced} was produced instead")
            }
            ConstructionFailure::Raised(cause) => write!(f, "the constructor failed: {cause}"),
        }
    }
}

/// Errors that abort a deep copy. No partial copy is ever returned.
#[derive(Debug)]
pub enum CopyError {
    /// No blank instance of a type could be obtained.
    Construction {
        /// The type that could not be instantiated
        shape: &'static Shape,
        /// What went wrong
        failure: ConstructionFailure,
    },

    /// A field, slot or container of a node could not be read or written.
    FieldAccess(AccessError),

    /// A plugin or a custom copy function failed.
    Plugin {
        /// Name of the plugin, or `custom copy` for custom copy functions
        plugin: &'static str,
        /// Shape of the node being copied
        shape: &'static Shape,
        /// The original failure
        cause: BoxError,
    },

    /// A node was reached that has no registered copy. Plugins that expose
    /// elements they did not instantiate end up here.
    Unregistered {
        /// Shape of the node
        shape: &'static Shape,
    },
}

impl CopyError {
    /// A [`CopyError::Plugin`] wrapping `cause`.
    pub fn plugin(
        plugin: &'static str,
        shape: &'static Shape,
        cause: impl Into<BoxError>,
    ) -> Self {
        CopyError::Plugin {
            plugin,
            shape,
            cause: cause.into(),
        }
    }
}

impl From<AccessError> for CopyError {
    fn from(value: AccessError) -> Self {
        CopyError::FieldAccess(value)
    }
}

impl core::fmt::Display for CopyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CopyError::Construction { shape, failure } => {
                write!(f, "cannot instantiate {shape}: {failure}")
            }
            CopyError::FieldAccess(err) => write!(f, "field access failed: {err}"),
            CopyError::Plugin {
                plugin,
                shape,
                cause,
            } => write!(f, "{plugin} failed on {shape}: {cause}"),
            CopyError::Unregistered { shape } => {
                write!(f, "{shape} node has no registered copy")
            }
        }
    }
}

impl core::error::Error for CopyError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            CopyError::Construction {
                failure: ConstructionFailure::Raised(cause),
                ..
            } => Some(&**cause),
            CopyError::FieldAccess(err) => Some(err),
            CopyError::Plugin { cause, .. } => Some(&**cause),
            _ => None,
        }
    }
}
