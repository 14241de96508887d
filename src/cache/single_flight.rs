use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// Collapses concurrent calls for the same key into one execution.
///
/// The first caller for a key (the leader) runs the work; callers arriving while it runs block on
/// the call's condvar and receive a clone of the leader's result.
pub(crate) struct SingleFlight<T> {
    calls: Mutex<HashMap<String, Arc<Call<T>>>>,
}

struct Call<T> {
    state: Mutex<CallState<T>>,
    done: Condvar,
}

enum CallState<T> {
    Running,
    Finished(Option<T>),
}

impl<T: Clone> Call<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(CallState::Running),
            done: Condvar::new(),
        }
    }

    fn finish(&self, value: Option<T>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = CallState::Finished(value);
        self.done.notify_all();
    }

    fn wait(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let CallState::Finished(v) = &*state {
                return v.clone();
            }
            state = self
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Publishes `None` to waiters if the leader unwinds before finishing.
struct LeaderGuard<'a, T: Clone> {
    flight: &'a SingleFlight<T>,
    key: &'a str,
    call: Arc<Call<T>>,
    finished: bool,
}

impl<T: Clone> LeaderGuard<'_, T> {
    fn complete(mut self, value: T) -> T {
        self.call.finish(Some(value.clone()));
        self.finished = true;
        value
    }
}

impl<T: Clone> Drop for LeaderGuard<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            self.call.finish(None);
        }
        self.flight.forget(self.key, &self.call);
    }
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SingleFlight<T> {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Run `work` for `key`, or wait for the run already in progress.
    ///
    /// Returns `None` only when the leader this caller waited on panicked.
    pub(crate) fn run(&self, key: &str, work: impl FnOnce() -> T) -> Option<T> {
        let (call, leader) = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            match calls.get(key) {
                Some(call) => (Arc::clone(call), false),
                None => {
                    let call = Arc::new(Call::new());
                    calls.insert(key.to_owned(), Arc::clone(&call));
                    (call, true)
                }
            }
        };

        if !leader {
            return call.wait();
        }

        let guard = LeaderGuard {
            flight: self,
            key,
            call,
            finished: false,
        };
        let value = work();
        Some(guard.complete(value))
    }

    /// Number of keys with a run in progress.
    pub(crate) fn in_flight(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn forget(&self, key: &str, call: &Arc<Call<T>>) {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        if calls.get(key).is_some_and(|c| Arc::ptr_eq(c, call)) {
            calls.remove(key);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/single_flight.rs"]
mod tests;
