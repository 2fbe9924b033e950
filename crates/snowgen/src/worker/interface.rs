use crate::error::Result;

/// A strategy for obtaining this process's worker id.
///
/// Providers report the raw id they derive. Range checks belong to
/// [`SnowflakeGenerator`](crate::SnowflakeGenerator) construction, so a
/// provider may legitimately hand back an id the generator then rejects.
pub trait WorkerIdProvider {
    /// Resolves the worker id.
    ///
    /// # Errors
    /// Implementation specific; see each provider.
    fn worker_id(&self) -> Result<u16>;
}

impl<P: WorkerIdProvider + ?Sized> WorkerIdProvider for &P {
    fn worker_id(&self) -> Result<u16> {
        (**self).worker_id()
    }
}

impl<P: WorkerIdProvider + ?Sized> WorkerIdProvider for Box<P> {
    fn worker_id(&self) -> Result<u16> {
        (**self).worker_id()
    }
}

/// A worker id supplied by configuration.
///
/// # Example
/// ```
/// use snowgen::{StaticWorkerId, WorkerIdProvider};
///
/// assert_eq!(StaticWorkerId(17).worker_id().unwrap(), 17);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticWorkerId(pub u16);

impl WorkerIdProvider for StaticWorkerId {
    fn worker_id(&self) -> Result<u16> {
        Ok(self.0)
    }
}
