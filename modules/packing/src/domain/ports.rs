/// Output port: publish domain events (no knowledge of transport).
///
/// The store calls `publish` while it still holds the lock of the change, so
/// implementations must return quickly and must not call back into the store.
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// Publisher that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl<E> EventPublisher<E> for NoopPublisher {
    fn publish(&self, _event: &E) {}
}
