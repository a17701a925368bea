use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::job::JobId;

/// One async mutex per job id, created on demand.
///
/// Manifest publishing and archive building are check-then-act on the
///  filesystem; holding a job's guard serializes them for that job
///  while unrelated jobs proceed in parallel. Entries are weak, so a
///  job nobody is touching costs nothing.
#[derive(Debug, Clone, Default)]
pub struct JobLocks {
    inner: Arc<Mutex<HashMap<JobId, Weak<AsyncMutex<()>>>>>,
}

impl JobLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, id: &JobId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            map.retain(|_, weak| weak.strong_count() > 0);
            match map.get(id).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    map.insert(id.clone(), Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().len()
    }
}
