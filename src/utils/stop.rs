use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 協作式停止旗標：Ctrl-C 時設定，抓取流程在每個請求之間檢查
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Requests a stop. Returns `true` when a stop was already pending,
    /// i.e. the user interrupted twice.
    pub fn interrupt(&self) -> bool {
        self.stopped.swap(true, Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }
}
