//! Fixed pool of isolated home directories.
//!
//! Each pooled home is an independent copy of a shared credential/config
//! directory, made once at provisioning time. A home is leased to at most
//! one execution at a time; leases are RAII guards, so release is exactly
//! once on every exit path. The pool never grows or shrinks after
//! provisioning.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{ExecError, Result};

/// Pool of provisioned home directories with blocking acquire/release.
pub struct HomePool {
    /// Homes currently not leased out.
    free: Arc<Mutex<Vec<PathBuf>>>,
    /// One permit per successfully provisioned home.
    permits: Arc<Semaphore>,
    provisioned: usize,
}

impl HomePool {
    /// Provision `size` copies of `source`, each in its own temp directory.
    ///
    /// Provisioning is best-effort: a slot whose temp allocation or copy
    /// fails is logged and skipped, and the pool proceeds with whatever
    /// subset succeeded. If every slot fails the pool is valid but empty,
    /// and [`HomePool::acquire`] will never complete.
    pub async fn provision(source: &Path, size: usize) -> Self {
        if tokio::fs::metadata(source).await.is_err() {
            tracing::warn!(
                "Shared config directory {} unavailable, pool will be degraded",
                source.display()
            );
        }

        let mut free = Vec::with_capacity(size);
        for slot in 0..size {
            match provision_home(source).await {
                Ok(dir) => {
                    tracing::debug!(slot, home = %dir.display(), "Provisioned pooled home");
                    free.push(dir);
                }
                Err(e) => {
                    tracing::error!(slot, "Failed to provision pooled home: {}", e);
                }
            }
        }

        let provisioned = free.len();
        tracing::info!(requested = size, provisioned, "Home pool ready");
        Self {
            free: Arc::new(Mutex::new(free)),
            permits: Arc::new(Semaphore::new(provisioned)),
            provisioned,
        }
    }

    /// Number of homes this pool provisioned (fixed for its lifetime).
    pub fn capacity(&self) -> usize {
        self.provisioned
    }

    /// Lease one home, suspending until one is available.
    ///
    /// There is no acquisition timeout; callers wait as long as necessary.
    /// Returns [`ExecError::PoolClosed`] once [`HomePool::shutdown`] has run.
    pub async fn acquire(&self) -> Result<HomeLease> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ExecError::PoolClosed)?;
        let dir = self
            .free
            .lock()
            .expect("pool lock poisoned")
            .pop()
            .expect("free home available under permit");
        Ok(HomeLease {
            dir,
            free: Arc::clone(&self.free),
            _permit: permit,
        })
    }

    /// Reclaim every home (waiting for in-flight leases to return), close
    /// the pool, and delete the backing directories.
    ///
    /// Individual deletion failures are logged and do not stop the rest.
    /// A second call observes the closed pool and returns immediately.
    pub async fn shutdown(&self) {
        tracing::info!(homes = self.provisioned, "Draining home pool");
        let reclaimed = match self
            .permits
            .clone()
            .acquire_many_owned(self.provisioned as u32)
            .await
        {
            Ok(permits) => permits,
            Err(_) => {
                tracing::warn!("Home pool already shut down");
                return;
            }
        };
        self.permits.close();
        reclaimed.forget();

        let homes: Vec<PathBuf> = {
            let mut free = self.free.lock().expect("pool lock poisoned");
            free.drain(..).collect()
        };
        for dir in &homes {
            if let Err(e) = tokio::fs::remove_dir_all(dir).await {
                tracing::warn!("Failed to remove pooled home {}: {}", dir.display(), e);
            }
        }
        tracing::info!("Home pool shut down");
    }
}

/// Exclusive lease on one pooled home directory.
///
/// Dropping the lease returns the home to the pool; the home is pushed back
/// before the permit wakes a waiter, so a woken acquirer always finds one.
pub struct HomeLease {
    dir: PathBuf,
    free: Arc<Mutex<Vec<PathBuf>>>,
    _permit: OwnedSemaphorePermit,
}

impl HomeLease {
    /// The leased home directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for HomeLease {
    fn drop(&mut self) {
        self.free
            .lock()
            .expect("pool lock poisoned")
            .push(std::mem::take(&mut self.dir));
        // The permit is released after this body runs, waking one waiter.
    }
}

/// Allocate a temp directory and copy `source` into it, preserving the
/// source's base name so the tool finds e.g. `<home>/.cf` where it expects.
async fn provision_home(source: &Path) -> std::io::Result<PathBuf> {
    let home = tempfile::Builder::new().prefix("pooled-home-").tempdir()?.keep();
    let dest = match source.file_name() {
        Some(name) => home.join(name),
        None => home.clone(),
    };
    if let Err(e) = copy_dir_recursive(source, &dest).await {
        let _ = tokio::fs::remove_dir_all(&home).await;
        return Err(e);
    }
    Ok(home)
}

async fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dst).await?;
    let mut entries = tokio::fs::read_dir(src).await?;
    while let Some(entry) = entries.next_entry().await? {
        let ty = entry.file_type().await?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if ty.is_dir() {
            Box::pin(copy_dir_recursive(&src_path, &dst_path)).await?;
        } else {
            tokio::fs::copy(&src_path, &dst_path).await?;
        }
    }
    Ok(())
}
