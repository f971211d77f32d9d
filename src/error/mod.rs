//! Utilities for game engine error handling.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use thiserror::Error;

/// Result of any operation which can return an error.
pub type Result<T> = std::result::Result<T, Error>;

/// General error type of the engine core.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Error {
    #[error("no such component or behaviour")]
    NoSuchElement,

    #[error("no space remaining in component storage")]
    NoSpaceRemaining,

    #[error("entity does not exist or is not tracked")]
    NoSuchEntity,

    #[error("entity was already deleted")]
    EntityAlreadyDeleted,

    #[error("component was already added to the entity")]
    ComponentAlreadyAdded,

    #[error("component type `{0}` is not registered")]
    ComponentNotRegistered(&'static str),

    #[error("parent would create a cycle in the transform hierarchy")]
    InvalidParent,

    #[error("engine has no initial state to set up")]
    EngineFailureNoInitialState,

    #[error("rendering terminated")]
    RenderingTerminated,
}

impl Error {
    /// Bit of this error inside of [`Status`].
    pub const fn bit(&self) -> u32 {
        match self {
            Error::NoSuchElement => 1,
            Error::NoSpaceRemaining => 1 << 1,
            Error::NoSuchEntity => 1 << 2,
            Error::EntityAlreadyDeleted => 1 << 3,
            Error::ComponentNotRegistered(_) => 1 << 5,
            Error::ComponentAlreadyAdded => 1 << 6,
            Error::InvalidParent => 1 << 7,
            Error::EngineFailureNoInitialState => 1 << 10,
            Error::RenderingTerminated => 1 << 12,
        }
    }
}

/// Set of result codes collected from several operations.
///
/// Fan-out operations (updating every system, draining queues) keep going
/// after a failure and OR the failures together.
///
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Status(u32);

impl Status {
    /// No failure was reported.
    pub const OK: Status = Status(0);

    /// Raw bits of this status.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` if no failure was reported.
    pub const fn is_ok(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the given error was reported.
    pub const fn contains(&self, error: Error) -> bool {
        self.0 & error.bit() != 0
    }

    /// Converts into a result holding the highest-priority reported error, if any.
    ///
    /// Status keeps only bits, so the conversion is lossy for
    /// [`Error::ComponentNotRegistered`]: its type name comes back as `"unknown"`.
    ///
    pub fn into_result(self) -> Result<()> {
        const ORDER: [Error; 8] = [
            Error::EngineFailureNoInitialState,
            Error::RenderingTerminated,
            Error::NoSpaceRemaining,
            Error::EntityAlreadyDeleted,
            Error::NoSuchEntity,
            Error::ComponentAlreadyAdded,
            Error::InvalidParent,
            Error::NoSuchElement,
        ];
        if self.is_ok() {
            return Ok(());
        }
        match ORDER.iter().find(|error| self.contains(**error)) {
            Some(error) => Err(*error),
            None => Err(Error::ComponentNotRegistered("unknown")),
        }
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        Self(error.bit())
    }
}

impl<T> From<Result<T>> for Status {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(_) => Status::OK,
            Err(error) => error.into(),
        }
    }
}

impl BitOr for Status {
    type Output = Status;

    fn bitor(self, rhs: Self) -> Self::Output {
        Status(self.0 | rhs.0)
    }
}

impl BitOr<Error> for Status {
    type Output = Status;

    fn bitor(self, rhs: Error) -> Self::Output {
        Status(self.0 | rhs.bit())
    }
}

impl BitOrAssign for Status {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitOrAssign<Error> for Status {
    fn bitor_assign(&mut self, rhs: Error) {
        self.0 |= rhs.bit();
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Status({:#b})", self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.into_result() {
            Ok(()) => write!(f, "ok"),
            Err(error) => write!(f, "{} (status bits {:#b})", error, self.0),
        }
    }
}
