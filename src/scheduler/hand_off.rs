//! `subscribe_on` / `observe_on`

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use log::trace;

use super::Scheduler;
use crate::core::{lock, Notification, Observable, Observer, StreamError, Subscriber};

/// Serial delivery queue: signals are pushed from any thread and drained in
/// order by at most one scheduled task at a time.
struct SerialQueue<T> {
    queue: Mutex<VecDeque<Notification<T>>>,
    pending: AtomicUsize,
    scheduler: Arc<dyn Scheduler>,
    downstream: Subscriber<T>,
}

impl<T: Send + 'static> SerialQueue<T> {
    fn enqueue(self: &Arc<Self>, notification: Notification<T>) {
        lock(&self.queue).push_back(notification);
        if self.pending.fetch_add(1, Ordering::AcqRel) == 0 {
            let this = self.clone();
            self.scheduler.schedule(Box::new(move || this.drain()));
        }
    }

    fn drain(&self) {
        loop {
            let next = lock(&self.queue).pop_front();
            if let Some(notification) = next {
                self.downstream.notify(notification);
            }
            if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                break;
            }
        }
    }
}

struct ObserveOnObserver<T>(Arc<SerialQueue<T>>);

impl<T: Send + 'static> Observer<T> for ObserveOnObserver<T> {
    fn on_next(&mut self, value: T) {
        self.0.enqueue(Notification::Next(value));
    }

    fn on_error(&mut self, error: StreamError) {
        self.0.enqueue(Notification::Error(error));
    }

    fn on_completed(&mut self) {
        self.0.enqueue(Notification::Completed);
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Run the subscription, and so all upstream work, on `scheduler`.
    ///
    /// `subscribe` returns immediately; if the handle is severed before the
    /// task starts, the upstream is never activated.
    pub fn subscribe_on<S>(&self, scheduler: S) -> Observable<T>
    where
        S: Scheduler + 'static,
    {
        let source = self.clone();
        let scheduler: Arc<dyn Scheduler> = Arc::new(scheduler);
        Observable::create(move |downstream: Subscriber<T>| {
            let source = source.clone();
            let scheduler_name = scheduler.name().to_string();
            scheduler.schedule(Box::new(move || {
                if downstream.is_unsubscribed() {
                    trace!("Subscription severed before activation on {scheduler_name}");
                    return;
                }
                source.subscribe_subscriber(downstream);
            }));
        })
    }

    /// Redeliver every signal, in order, on `scheduler`.
    ///
    /// Signals still queued when the subscription is severed are dropped.
    pub fn observe_on<S>(&self, scheduler: S) -> Observable<T>
    where
        S: Scheduler + 'static,
    {
        let source = self.clone();
        let scheduler: Arc<dyn Scheduler> = Arc::new(scheduler);
        Observable::create(move |downstream: Subscriber<T>| {
            let upstream = downstream.subscription().child();
            let queue = Arc::new(SerialQueue {
                queue: Mutex::new(VecDeque::new()),
                pending: AtomicUsize::new(0),
                scheduler: scheduler.clone(),
                downstream,
            });
            source.subscribe_subscriber(Subscriber::new(ObserveOnObserver(queue), upstream));
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{mpsc, Arc, Mutex},
        thread::{self, ThreadId},
        time::Duration,
    };

    use super::*;
    use crate::{
        core::{
            testing::{is_completed, recorder, values, WAIT},
            StreamResult,
        },
        scheduler::{IoScheduler, Looper},
    };

    #[test]
    fn test_subscribe_on_moves_work_to_io() {
        let io = IoScheduler::new(2).unwrap();
        let worker: Arc<Mutex<Option<ThreadId>>> = Arc::default();
        let slot = worker.clone();

        let (observer, events) = recorder();
        Observable::from_callable(move || -> StreamResult<i32> {
            *slot.lock().unwrap() = Some(thread::current().id());
            Ok(5)
        })
        .subscribe_on(io)
        .subscribe(observer);

        let events = events.wait_terminal(WAIT);
        assert_eq!(values(&events), vec![5]);
        assert!(is_completed(&events));
        let worker = worker.lock().unwrap().unwrap();
        assert_ne!(worker, thread::current().id());
    }

    #[test]
    fn test_subscribe_on_survives_dropped_scheduler() {
        for _ in 0..50 {
            let io = IoScheduler::new(1).unwrap();
            // Leave an idle blocking worker behind so the next task is queued to it.
            let (warm_tx, warm_rx) = mpsc::channel();
            io.schedule(Box::new(move || {
                let _ = warm_tx.send(());
            }));
            warm_rx.recv_timeout(WAIT).unwrap();

            let (observer, events) = recorder();
            Observable::just(7).subscribe_on(io).subscribe(observer);

            let events = events.wait_terminal(WAIT);
            assert_eq!(values(&events), vec![7]);
            assert!(is_completed(&events));
        }
    }

    #[test]
    fn test_observe_on_survives_dropped_scheduler() {
        let (observer, events) = recorder();
        Observable::from_iter(0..20)
            .observe_on(IoScheduler::new(1).unwrap())
            .subscribe(observer);

        let events = events.wait_terminal(WAIT);
        assert_eq!(values(&events), (0..20).collect::<Vec<_>>());
        assert!(is_completed(&events));
    }

    #[test]
    fn test_observe_on_delivers_in_order_on_looper() {
        let looper = Looper::spawn("observe-on").unwrap();

        let (observer, events) = recorder();
        Observable::from_iter(0..50)
            .observe_on(looper.scheduler())
            .subscribe(observer);

        let snapshot = events.wait_terminal(WAIT);
        assert_eq!(values(&snapshot), (0..50).collect::<Vec<_>>());
        assert!(is_completed(&snapshot));
        assert!(events.threads().iter().all(|t| *t == looper.thread_id()));
        looper.quit();
    }

    #[test]
    fn test_observe_on_thread_pool_keeps_order() {
        let io = IoScheduler::new(4).unwrap();

        let (observer, events) = recorder();
        Observable::from_iter(0..200).observe_on(io).subscribe(observer);

        let snapshot = events.wait_terminal(WAIT);
        assert_eq!(values(&snapshot), (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_hand_off_thread_identity() {
        let looper = Looper::spawn("hand-off-ui").unwrap();
        let io = IoScheduler::new(2).unwrap();
        let fetch_thread: Arc<Mutex<Option<ThreadId>>> = Arc::default();
        let slot = fetch_thread.clone();
        let (tx, rx) = mpsc::channel();

        let _subscription = Observable::from_callable(move || -> StreamResult<String> {
            *slot.lock().unwrap() = Some(thread::current().id());
            Ok("body".chars().count().to_string())
        })
        .subscribe_on(io)
        .observe_on(looper.scheduler())
        .subscribe_next(move |value| {
            let _ = tx.send((value, thread::current().id()));
        });

        let (value, callback_thread) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let fetch_thread = fetch_thread.lock().unwrap().unwrap();

        assert_eq!(value, "4");
        assert_eq!(callback_thread, looper.thread_id());
        assert_ne!(callback_thread, fetch_thread);
        looper.quit();
    }

    #[test]
    fn test_sever_before_emission_delivers_nothing() {
        let io = IoScheduler::new(1).unwrap();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let gate_rx = Mutex::new(gate_rx);
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let done_tx = Mutex::new(done_tx);

        let (observer, events) = recorder::<String>();
        let subscription = Observable::from_callable(move || {
            let _ = gate_rx.lock().unwrap().recv();
            let _ = done_tx.lock().unwrap().send(());
            Ok("late".to_string())
        })
        .subscribe_on(io)
        .subscribe(observer);

        subscription.unsubscribe();
        let _ = gate_tx.send(());

        // The callable may or may not have started; either way nothing is delivered.
        let _ = done_rx.recv_timeout(Duration::from_millis(500));
        thread::sleep(Duration::from_millis(50));
        assert!(events.snapshot().is_empty());
    }

    #[test]
    fn test_sever_drops_queued_deliveries() {
        let looper = Looper::spawn("sever-queue").unwrap();
        let (block_tx, block_rx) = mpsc::channel::<()>();
        looper
            .post(move || {
                let _ = block_rx.recv();
            })
            .unwrap();

        let (observer, events) = recorder();
        let subscription = Observable::from_iter(vec![1, 2, 3])
            .observe_on(looper.scheduler())
            .subscribe(observer);
        subscription.unsubscribe();
        let _ = block_tx.send(());

        let (flush_tx, flush_rx) = mpsc::channel();
        looper
            .post(move || {
                let _ = flush_tx.send(());
            })
            .unwrap();
        flush_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(values(&events.snapshot()).is_empty());
        looper.quit();
    }
}
