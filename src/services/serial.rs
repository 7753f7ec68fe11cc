/// Single-consumer FIFO queue for operations whose side effects must not
/// interleave. Jobs run strictly in submission order and each job finishes
/// before the next one starts.

use std::future::Future;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};

use crate::error::{GroupError, Result};

type Job = BoxFuture<'static, ()>;

/// Cloneable handle to the queue; clones feed the same consumer.
#[derive(Clone)]
pub struct SerialQueue {
    job_tx: mpsc::UnboundedSender<Job>,
}

impl SerialQueue {
    /// Starts the consumer task. Must be called inside a tokio runtime.
    pub fn new() -> Self {
        let (job_tx, mut job_rx) = mpsc::unbounded_channel::<Job>();

        // Drain jobs one at a time; a job is awaited to completion before
        // the next is taken off the queue.
        tokio::spawn(async move {
            while let Some(job) = job_rx.recv().await {
                job.await;
            }
        });

        SerialQueue { job_tx }
    }

    /// Enqueues `task` and waits for it to finish, passing its result
    /// through. The enqueue happens on the returned future's first poll, so
    /// tasks execute in the order their `run` futures are first polled.
    pub async fn run<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();

        let job: Job = Box::pin(async move {
            // The receiver going away just means the caller stopped waiting.
            let _ = done_tx.send(task.await);
        });
        self.job_tx
            .send(job)
            .map_err(|_| GroupError::Transport("serial queue is closed".to_string()))?;

        done_rx
            .await
            .map_err(|_| GroupError::Transport("serial queue dropped the task".to_string()))?
    }
}

impl Default for SerialQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_result_passes_through() {
        let queue = SerialQueue::new();
        let value = queue.run(async { Ok::<_, GroupError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_task_errors_propagate() {
        let queue = SerialQueue::new();
        let result: Result<u8> = queue
            .run(async { Err(GroupError::Transport("gone".to_string())) })
            .await;
        assert!(matches!(result.unwrap_err(), GroupError::Transport(_)));
    }

    #[tokio::test]
    async fn test_jobs_run_in_submission_order() {
        let queue = SerialQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        // The first job sleeps; an interleaving executor would let the
        // second job overtake it.
        let slow = {
            let order = order.clone();
            queue.run(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                order.lock().await.push(1);
                Ok::<_, GroupError>(())
            })
        };
        let fast = {
            let order = order.clone();
            queue.run(async move {
                order.lock().await.push(2);
                Ok::<_, GroupError>(())
            })
        };

        let (first, second) = tokio::join!(slow, fast);
        first.unwrap();
        second.unwrap();
        assert_eq!(*order.lock().await, vec![1, 2]);
    }
}
