use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::FutureExt;

/// Work an update hands back to the runtime: zero or more futures, each
/// resolving to the next message.
pub struct Task<M> {
    futures: Vec<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    pub fn none() -> Self {
        Task {
            futures: Vec::new(),
        }
    }

    pub fn future(f: impl Future<Output = M> + Send + 'static) -> Self {
        Task {
            futures: vec![f.boxed()],
        }
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task<M>>) -> Self {
        Task {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub(super) fn spawn_into(self, pending: &mut FuturesUnordered<BoxFuture<'static, M>>) {
        pending.extend(self.futures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn batch_runs_every_future() {
        let task = Task::batch([
            Task::future(async { 1 }),
            Task::none(),
            Task::batch([Task::future(async { 2 }), Task::future(async { 3 })]),
        ]);
        assert!(!task.is_none());

        let mut pending = FuturesUnordered::new();
        task.spawn_into(&mut pending);
        let mut out: Vec<i32> = pending.collect().await;
        out.sort();
        assert_eq!(out, vec![1, 2, 3]);
        assert!(Task::<i32>::none().is_none());
    }
}
