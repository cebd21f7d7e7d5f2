use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::models::GenerationRequest;

/// Anything that can turn a prompt into script text.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, request: &GenerationRequest) -> Result<String, GenerationError>;

    fn name(&self) -> &'static str;
}

/// Allows at most one generation in flight. A second caller is turned away, not queued.
#[derive(Clone, Default)]
pub struct GenerationGuard {
    busy: Arc<AtomicBool>,
}

impl GenerationGuard {
    pub fn try_acquire(&self) -> Result<GenerationPermit, GenerationError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| GenerationPermit { busy: self.busy.clone() })
            .map_err(|_| GenerationError::Busy)
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped, including on error paths.
pub struct GenerationPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
