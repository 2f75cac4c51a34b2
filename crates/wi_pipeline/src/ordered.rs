//! Bounded fan-out whose results come back in submission order.

use std::future::Future;

use futures::stream::{self, StreamExt};
use tokio::time::{sleep_until, Instant};

/// Outputs slotted by submission index. A `None` slot was still in flight
/// when the deadline passed.
#[derive(Debug)]
pub struct Ordered<T> {
    pub slots: Vec<Option<T>>,
    pub truncated: bool,
}

impl<T> Ordered<T> {
    pub fn completed(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Completed outputs in submission order.
    pub fn into_completed(self) -> impl Iterator<Item = T> {
        self.slots.into_iter().flatten()
    }
}

/// Runs at most `limit` of `futures` at once and stops waiting at `deadline`.
///
/// Futures still running at the deadline are dropped.
pub async fn collect_ordered<I, Fut, T>(futures: I, limit: usize, deadline: Option<Instant>) -> Ordered<T>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = T>,
{
    let tagged: Vec<_> = futures
        .into_iter()
        .enumerate()
        .map(|(index, fut)| async move { (index, fut.await) })
        .collect();

    let mut slots: Vec<Option<T>> = (0..tagged.len()).map(|_| None).collect();
    let mut pending = stream::iter(tagged).buffer_unordered(limit.max(1));
    let mut truncated = false;

    loop {
        let next = match deadline {
            Some(deadline) => tokio::select! {
                biased;
                next = pending.next() => next,
                _ = sleep_until(deadline) => {
                    truncated = true;
                    break;
                }
            },
            None => pending.next().await,
        };
        match next {
            Some((index, output)) => slots[index] = Some(output),
            None => break,
        }
    }

    Ordered { slots, truncated }
}
