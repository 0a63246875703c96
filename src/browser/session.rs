//! Scoped browser sessions under the distributed lock.
//!
//! A session owns two resources: the lock handle and the browser. Both are
//! held by a [`SessionGuard`] so that whichever way the routine finishes
//! (value, error, panic, or the caller dropping the future) the browser is
//! closed first and the lock released second, each exactly once.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use super::{Browser, BrowserLauncher};
use crate::error::ScrapeResult;
use crate::lock::{LockHandle, LockManager};

/// Runs routines against a freshly launched browser while holding the lock.
#[derive(Clone)]
pub struct SessionController {
    lock: LockManager,
    launcher: Arc<dyn BrowserLauncher>,
}

impl SessionController {
    pub fn new(lock: LockManager, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self { lock, launcher }
    }

    pub fn lock(&self) -> &LockManager {
        &self.lock
    }

    /// Acquire the lock, launch a browser, run `routine`, then tear down.
    ///
    /// A held lock fails fast without launching anything. A launch failure
    /// releases the lock before the error is returned. A panic inside the
    /// routine is resumed after cleanup has completed.
    pub async fn with_locked_browser<T, F, Fut>(
        &self,
        resource_id: &str,
        routine: F,
    ) -> ScrapeResult<T>
    where
        F: FnOnce(Arc<dyn Browser>) -> Fut,
        Fut: Future<Output = ScrapeResult<T>>,
    {
        let handle = self.lock.acquire(resource_id).await?;
        let mut guard = SessionGuard::new(self.lock.clone(), handle);

        let browser = match self.launcher.launch().await {
            Ok(browser) => browser,
            Err(e) => {
                warn!("Browser launch failed for {}: {}", resource_id, e);
                guard.finish().await;
                return Err(e);
            }
        };
        guard.attach(browser.clone());
        debug!("Browser session started for {}", resource_id);

        let outcome = AssertUnwindSafe(async move { routine(browser).await })
            .catch_unwind()
            .await;

        guard.finish().await;
        debug!("Browser session finished for {}", resource_id);

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Owns the session's resources until they are torn down.
struct SessionGuard {
    lock: LockManager,
    handle: Option<LockHandle>,
    browser: Option<Arc<dyn Browser>>,
}

impl SessionGuard {
    fn new(lock: LockManager, handle: LockHandle) -> Self {
        Self {
            lock,
            handle: Some(handle),
            browser: None,
        }
    }

    fn attach(&mut self, browser: Arc<dyn Browser>) {
        self.browser = Some(browser);
    }

    /// Close the browser, then release the lock. Idempotent.
    ///
    /// Teardown runs on its own task so that dropping the caller while the
    /// browser is closing cannot strand the lock handle.
    async fn finish(&mut self) {
        let browser = self.browser.take();
        let handle = self.handle.take();
        if browser.is_none() && handle.is_none() {
            return;
        }

        let lock = self.lock.clone();
        let task = tokio::spawn(async move { teardown(&lock, browser, handle).await });
        if let Err(e) = task.await {
            warn!("Browser session teardown task failed: {}", e);
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let browser = self.browser.take();
        let handle = self.handle.take();
        if browser.is_none() && handle.is_none() {
            return;
        }

        // The owning future was cancelled mid-session
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let lock = self.lock.clone();
                runtime.spawn(async move { teardown(&lock, browser, handle).await });
            }
            Err(_) => warn!(
                "Browser session dropped outside a runtime; lock '{}' will expire after its TTL",
                self.lock.key()
            ),
        }
    }
}

async fn teardown(lock: &LockManager, browser: Option<Arc<dyn Browser>>, handle: Option<LockHandle>) {
    if let Some(browser) = browser {
        browser.close().await;
    }
    if let Some(handle) = handle {
        lock.release(handle).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::browser::PageDriver;
    use crate::error::ScrapeError;

    #[derive(Default)]
    struct Counts {
        launched: AtomicUsize,
        closed: AtomicUsize,
    }

    struct CountingBrowser(Arc<Counts>);

    #[async_trait]
    impl Browser for CountingBrowser {
        async fn new_page(&self) -> ScrapeResult<Box<dyn PageDriver>> {
            Err(ScrapeError::Evaluation("no pages in this test".to_string()))
        }

        async fn close(&self) {
            self.0.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingLauncher(Arc<Counts>);

    #[async_trait]
    impl BrowserLauncher for CountingLauncher {
        async fn launch(&self) -> ScrapeResult<Arc<dyn Browser>> {
            self.0.launched.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(CountingBrowser(self.0.clone())))
        }
    }

    fn controller() -> (SessionController, Arc<Counts>) {
        let counts = Arc::new(Counts::default());
        let launcher = Arc::new(CountingLauncher(counts.clone()));
        (SessionController::new(LockManager::in_memory(), launcher), counts)
    }

    #[tokio::test]
    async fn test_success_closes_and_releases() {
        let (session, counts) = controller();
        let value = session
            .with_locked_browser("list", |_browser| async { Ok(7) })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(counts.closed.load(Ordering::SeqCst), 1);
        assert!(session.lock().current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_panic_still_cleans_up() {
        let (session, counts) = controller();
        let inner = session.clone();
        let joined = tokio::spawn(async move {
            inner
                .with_locked_browser("list", |_browser| async {
                    if true {
                        panic!("routine blew up");
                    }
                    Ok(())
                })
                .await
        })
        .await;

        assert!(joined.unwrap_err().is_panic());
        assert_eq!(counts.closed.load(Ordering::SeqCst), 1);
        assert!(session.lock().current().await.unwrap().is_none());
    }

    struct SlowClosingBrowser(Arc<Counts>);

    #[async_trait]
    impl Browser for SlowClosingBrowser {
        async fn new_page(&self) -> ScrapeResult<Box<dyn PageDriver>> {
            Err(ScrapeError::Evaluation("no pages in this test".to_string()))
        }

        async fn close(&self) {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            self.0.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct SlowClosingLauncher(Arc<Counts>);

    #[async_trait]
    impl BrowserLauncher for SlowClosingLauncher {
        async fn launch(&self) -> ScrapeResult<Arc<dyn Browser>> {
            self.0.launched.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(SlowClosingBrowser(self.0.clone())))
        }
    }

    #[tokio::test]
    async fn test_cancelled_during_close_still_releases() {
        let counts = Arc::new(Counts::default());
        let launcher = Arc::new(SlowClosingLauncher(counts.clone()));
        let session = SessionController::new(LockManager::in_memory(), launcher);

        // The routine finishes, then the caller gives up while close() is pending
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            session.with_locked_browser("list", |_browser| async {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                Ok(())
            }),
        )
        .await;
        assert!(result.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        assert_eq!(counts.closed.load(Ordering::SeqCst), 1);
        assert!(session.lock().current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_session_cleans_up() {
        let (session, counts) = controller();
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            session.with_locked_browser("list", |_browser| async {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                Ok(())
            }),
        )
        .await;
        assert!(result.is_err());

        // Cleanup runs on a spawned task
        for _ in 0..50 {
            if session.lock().current().await.unwrap().is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(counts.launched.load(Ordering::SeqCst), 1);
        assert_eq!(counts.closed.load(Ordering::SeqCst), 1);
        assert!(session.lock().current().await.unwrap().is_none());
    }
}
