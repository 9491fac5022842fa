use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 视图的生命周期标记
///
/// 发起请求前取一个 [`ViewTicket`]；离开视图后 ticket 失效，
/// 迟到的响应据此被丢弃而不会写入已离开视图的状态。
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct ViewTicket {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> ViewTicket {
        ViewTicket {
            generation: self.generation.clone(),
            issued: self.generation.load(Ordering::Acquire),
        }
    }

    /// 离开视图（或重新进入），之前发出的 ticket 全部失效
    pub fn leave(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl ViewTicket {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.issued
    }
}
