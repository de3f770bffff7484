//! Single-threaded executor driven explicitly by tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures_task::{waker, ArcWake, LocalFutureObj, LocalSpawn, SpawnError};

type ReadyQueue = Arc<Mutex<VecDeque<usize>>>;

struct TaskWaker {
    id: usize,
    ready: ReadyQueue,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        if let Ok(mut ready) = arc_self.ready.lock() {
            if !ready.contains(&arc_self.id) {
                ready.push_back(arc_self.id);
            }
        }
    }
}

/// Runs spawned futures only when [`run_until_stalled`](Self::run_until_stalled)
/// is called, so tests decide when "the next event loop turn" happens.
#[derive(Default)]
pub struct LocalExecutor {
    tasks: RefCell<HashMap<usize, LocalFutureObj<'static, ()>>>,
    ready: ReadyQueue,
    next_id: Cell<usize>,
    shut_down: Cell<bool>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls woken tasks until none is ready. Returns the number of polls.
    pub fn run_until_stalled(&self) -> usize {
        let mut polls = 0;
        loop {
            let next = self.ready.lock().ok().and_then(|mut ready| ready.pop_front());
            let Some(id) = next else {
                return polls;
            };
            // The task is taken out while polling so it can spawn or wake freely.
            let Some(mut task) = self.tasks.borrow_mut().remove(&id) else {
                continue;
            };
            let waker = waker(Arc::new(TaskWaker {
                id,
                ready: Arc::clone(&self.ready),
            }));
            let mut cx = Context::from_waker(&waker);
            polls += 1;
            if let Poll::Pending = Pin::new(&mut task).poll(&mut cx) {
                self.tasks.borrow_mut().insert(id, task);
            }
        }
    }

    /// Tasks spawned and not yet completed.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Makes every later spawn fail, like an executor that has shut down.
    pub fn shut_down(&self) {
        self.shut_down.set(true);
    }
}

impl LocalSpawn for LocalExecutor {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        self.status_local()?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.tasks.borrow_mut().insert(id, future);
        if let Ok(mut ready) = self.ready.lock() {
            ready.push_back(id);
        }
        Ok(())
    }

    fn status_local(&self) -> Result<(), SpawnError> {
        if self.shut_down.get() {
            Err(SpawnError::shutdown())
        } else {
            Ok(())
        }
    }
}
