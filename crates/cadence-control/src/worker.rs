// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Owned, joinable thread handles.

use crate::error::{PacingError, PacingResult};
use std::thread::{self, JoinHandle};

/// A named thread that is always joined: explicitly through
/// [`join`](Self::join), or when the handle is dropped.
///
/// Cancellation is cooperative and goes through the
/// [`SyncCoordinator`](crate::sync::SyncCoordinator); the handle only owns
/// the thread's lifetime.
#[derive(Debug)]
pub struct WorkerHandle {
    name: String,
    handle: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawns a named thread running `body`.
    pub fn spawn<F>(name: &str, body: F) -> PacingResult<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(body)
            .map_err(|source| PacingError::ThreadSpawn {
                name: name.to_string(),
                source,
            })?;
        Ok(Self {
            name: name.to_string(),
            handle: Some(handle),
        })
    }

    /// Thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` once the thread body has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the thread to exit.
    pub fn join(mut self) -> PacingResult<()> {
        self.join_inner()
    }

    fn join_inner(&mut self) -> PacingResult<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PacingError::ThreadPanicked(self.name.clone())),
            None => Ok(()),
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.join_inner() {
            log::error!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_join_waits_for_body() {
        let ran = Arc::new(AtomicBool::new(false));
        let worker = {
            let ran = Arc::clone(&ran);
            WorkerHandle::spawn("test-worker", move || {
                std::thread::sleep(std::time::Duration::from_millis(10));
                ran.store(true, Ordering::SeqCst);
            })
            .unwrap()
        };
        assert_eq!(worker.name(), "test-worker");
        worker.join().unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_panic_is_reported() {
        let worker = WorkerHandle::spawn("test-panic", || panic!("boom")).unwrap();
        assert!(matches!(worker.join(), Err(PacingError::ThreadPanicked(name)) if name == "test-panic"));
    }

    #[test]
    fn test_drop_joins() {
        let ran = Arc::new(AtomicBool::new(false));
        {
            let ran = Arc::clone(&ran);
            let _worker = WorkerHandle::spawn("test-drop", move || {
                std::thread::sleep(std::time::Duration::from_millis(10));
                ran.store(true, Ordering::SeqCst);
            })
            .unwrap();
        }
        assert!(ran.load(Ordering::SeqCst));
    }
}
