//! Deferred session events.
//!
//! Timers are tokio tasks that sleep and then post a `SessionEvent` back to the
//! session's channel. The session handles every event on its own task, so
//! timer callbacks never run concurrently with each other or with input.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The simulated history fetch finished.
    HistoryReady,
    /// Typing debounce expired; carries the generation that armed it.
    TypingElapsed(u64),
    PresenceTick,
    /// A scheduled reply is due; carries the reply id.
    ReplyDue(u64),
}

/// Handle to a scheduled task. Cancelling (or dropping) it aborts the task.
#[derive(Debug)]
pub struct TaskHandle {
    abort: AbortHandle,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl Scheduler {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Post `event` once after `delay`.
    pub fn after(&self, delay: Duration, event: SessionEvent) -> TaskHandle {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
        TaskHandle {
            abort: task.abort_handle(),
        }
    }

    /// Post `event` every `period`, first firing one period from now. A zero
    /// period is treated as 1ms.
    pub fn every(&self, period: Duration, event: SessionEvent) -> TaskHandle {
        let period = period.max(Duration::from_millis(1));
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
        TaskHandle {
            abort: task.abort_handle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(2),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once_at_deadline() {
        let (scheduler, mut rx) = Scheduler::channel();
        let start = Instant::now();
        let _handle = scheduler.after(Duration::from_millis(250), SessionEvent::ReplyDue(1));

        assert_eq!(rx.recv().await, Some(SessionEvent::ReplyDue(1)));
        assert_elapsed(start, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_delivery() {
        let (scheduler, mut rx) = Scheduler::channel();
        let handle = scheduler.after(Duration::from_millis(100), SessionEvent::PresenceTick);
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_with_zero_period_still_ticks() {
        let (scheduler, mut rx) = Scheduler::channel();
        let _handle = scheduler.every(Duration::ZERO, SessionEvent::PresenceTick);

        let tick = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
        assert_eq!(tick, Ok(Some(SessionEvent::PresenceTick)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_repeats_after_first_period() {
        let (scheduler, mut rx) = Scheduler::channel();
        let start = Instant::now();
        let _handle = scheduler.every(Duration::from_secs(30), SessionEvent::PresenceTick);

        assert_eq!(rx.recv().await, Some(SessionEvent::PresenceTick));
        assert_elapsed(start, Duration::from_secs(30));
        assert_eq!(rx.recv().await, Some(SessionEvent::PresenceTick));
        assert_elapsed(start, Duration::from_secs(60));
    }
}
