//! Event coalescing for watch mode.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Coalesces events for as long as the handler is busy.
///
/// Producers push events while the handler may still be working on an earlier
/// one. Only the most recent pending event is kept; when the handler
/// finishes, it picks that one up. Intermediate events that became obsolete
/// while the handler was busy are never processed.
pub struct Debouncer<T>
where
    T: Send + 'static,
{
    inner: Inner<T>,
}

struct Inner<T>
where
    T: Send + 'static,
{
    notify: Arc<Notify>,
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Default for Inner<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self {
            notify: Default::default(),
            slot: Default::default(),
        }
    }
}

impl<T> Debouncer<T>
where
    T: Send + 'static,
{
    /// Spawn the handler loop. Must be called within a tokio runtime.
    pub fn new<H, Fut>(mut handler: H) -> Self
    where
        H: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let notify = Arc::new(Notify::new());
        let slot: Arc<Mutex<Option<T>>> = Default::default();

        {
            let notify = notify.clone();
            let slot = slot.clone();
            tokio::spawn(async move {
                loop {
                    notify.notified().await;
                    let next = slot.lock().await.take();
                    match next {
                        Some(event) => handler(event).await,
                        // An empty slot after a notification means shutdown.
                        None => break,
                    }
                }
            });
        }

        Self {
            inner: Inner { notify, slot },
        }
    }

    /// Push an event to the debouncer.
    ///
    /// Returns immediately; the handler sees the event now, later, or never
    /// if a newer event supersedes it first.
    pub async fn push(&self, event: T) {
        self.inner.send(Some(event)).await;
    }
}

impl<T> Inner<T>
where
    T: Send + 'static,
{
    async fn send(&self, message: Option<T>) {
        *self.slot.lock().await = message;
        self.notify.notify_one();
    }
}

impl<T> Drop for Debouncer<T>
where
    T: Send + 'static,
{
    fn drop(&mut self) {
        let mut dropping = Default::default();
        std::mem::swap(&mut self.inner, &mut dropping);
        tokio::spawn(async move { dropping.send(None).await });
    }
}
