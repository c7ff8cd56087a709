use std::any::Any;
use std::error::Error;
use std::fmt;

/// Error returned by [`TaskPool::init`] when the worker threads cannot be
/// started.
///
/// [`TaskPool::init`]: struct.TaskPool.html#method.init
#[derive(Debug)]
pub struct StartError {
    kind: StartErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StartErrorKind {
    AlreadyStarted,
    Shutdown,
}

impl StartError {
    pub(crate) fn already_started() -> StartError {
        StartError {
            kind: StartErrorKind::AlreadyStarted,
        }
    }

    pub(crate) fn shutdown() -> StartError {
        StartError {
            kind: StartErrorKind::Shutdown,
        }
    }

    /// Returns `true` if the pool had already been initialized.
    pub fn is_already_started(&self) -> bool {
        self.kind == StartErrorKind::AlreadyStarted
    }

    /// Returns `true` if the pool was shut down before `init` was called.
    pub fn is_shutdown(&self) -> bool {
        self.kind == StartErrorKind::Shutdown
    }
}

impl fmt::Display for StartError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            StartErrorKind::AlreadyStarted => "task pool is already initialized".fmt(fmt),
            StartErrorKind::Shutdown => "task pool is shut down".fmt(fmt),
        }
    }
}

impl Error for StartError {}

/// Error returned when a job cannot be submitted to the pool.
///
/// Submission fails if the pool has not been initialized yet or if it has
/// been shut down. Both are caller errors reported synchronously; a job that
/// was accepted is never silently discarded without completing its
/// [`JobHandle`].
///
/// [`JobHandle`]: struct.JobHandle.html
#[derive(Debug)]
pub struct SpawnError {
    kind: SpawnErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpawnErrorKind {
    NotStarted,
    Shutdown,
}

impl SpawnError {
    pub(crate) fn not_started() -> SpawnError {
        SpawnError {
            kind: SpawnErrorKind::NotStarted,
        }
    }

    pub(crate) fn shutdown() -> SpawnError {
        SpawnError {
            kind: SpawnErrorKind::Shutdown,
        }
    }

    /// Returns `true` if the pool has not been initialized yet.
    pub fn is_not_started(&self) -> bool {
        self.kind == SpawnErrorKind::NotStarted
    }

    /// Returns `true` if the pool has been shut down.
    pub fn is_shutdown(&self) -> bool {
        self.kind == SpawnErrorKind::Shutdown
    }
}

impl fmt::Display for SpawnError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            SpawnErrorKind::NotStarted => "task pool has not been initialized".fmt(fmt),
            SpawnErrorKind::Shutdown => "task pool is shut down".fmt(fmt),
        }
    }
}

impl Error for SpawnError {}

/// Error produced by a [`JobHandle`] whose job did not yield a value.
///
/// A job fails in one of two ways: its body panicked, in which case the
/// panic payload is captured here, or it was abandoned, meaning it was still
/// queued when the pool shut down (or its task was otherwise dropped before
/// running).
///
/// [`JobHandle`]: struct.JobHandle.html
pub struct JobError {
    repr: Repr,
}

enum Repr {
    Panicked(Box<dyn Any + Send + 'static>),
    Abandoned,
}

impl JobError {
    pub(crate) fn panicked(payload: Box<dyn Any + Send + 'static>) -> JobError {
        JobError {
            repr: Repr::Panicked(payload),
        }
    }

    pub(crate) fn abandoned() -> JobError {
        JobError {
            repr: Repr::Abandoned,
        }
    }

    /// Returns `true` if the job body panicked.
    pub fn is_panic(&self) -> bool {
        match self.repr {
            Repr::Panicked(_) => true,
            Repr::Abandoned => false,
        }
    }

    /// Returns `true` if the job never ran because the pool shut down first.
    pub fn is_abandoned(&self) -> bool {
        match self.repr {
            Repr::Panicked(_) => false,
            Repr::Abandoned => true,
        }
    }

    /// Consumes the error, returning the panic payload.
    ///
    /// # Panics
    ///
    /// Panics if the error is not a panic error. Check with [`is_panic`]
    /// first.
    ///
    /// [`is_panic`]: #method.is_panic
    pub fn into_panic(self) -> Box<dyn Any + Send + 'static> {
        match self.repr {
            Repr::Panicked(payload) => payload,
            Repr::Abandoned => panic!("`JobError` does not hold a panic payload"),
        }
    }
}

impl fmt::Debug for JobError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self.repr {
            Repr::Panicked(_) => fmt.write_str("JobError::Panicked(..)"),
            Repr::Abandoned => fmt.write_str("JobError::Abandoned"),
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self.repr {
            Repr::Panicked(_) => "job panicked".fmt(fmt),
            Repr::Abandoned => "job was abandoned before it produced a value".fmt(fmt),
        }
    }
}

impl Error for JobError {}
