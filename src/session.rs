use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::phrase_matcher::MatchResult;
use crate::recognizer::Recognition;

/// 一次识别 + 匹配的完整结果
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub recognition: Recognition,
    pub matched: MatchResult,
}

/// 界面需要的状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub waiting: bool,
    pub message: String,
}

impl StatusSnapshot {
    /// 按钮是否可点击
    pub fn can_start(&self, mic_permission: bool) -> bool {
        !self.waiting && mic_permission
    }
}

#[derive(Debug)]
struct Session {
    waiting: bool,
    message: String,
    pending: Option<Outcome>,
}

/// 后台识别任务与主循环之间唯一的交接点。
///
/// 所有字段由同一把锁保护；`pending` 只有一个槽位，由 [`SessionState::take_pending`]
/// 取走后清空，保证每个结果只被消费一次。
#[derive(Debug)]
pub struct SessionState {
    inner: Mutex<Session>,
}

impl SessionState {
    pub fn new(initial_message: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Session {
                waiting: false,
                message: initial_message.into(),
                pending: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 标记开始识别；已有识别在进行中时返回 false
    pub fn try_begin(&self) -> bool {
        let mut session = self.lock();
        if session.waiting {
            return false;
        }
        session.waiting = true;
        true
    }

    /// 识别结束：更新状态文本并放入待处理结果
    pub fn complete(&self, outcome: Outcome) {
        let mut session = self.lock();
        session.message = outcome.recognition.status_message();
        session.waiting = false;
        if let Some(stale) = session.pending.replace(outcome) {
            log::warn!("上一个识别结果未被处理，已丢弃: {:?}", stale.recognition);
        }
    }

    /// 识别被放弃（超时、任务取消）：只清除等待状态，不产生结果
    pub fn abandon(&self) {
        let mut session = self.lock();
        if session.waiting {
            log::warn!("识别未完成即被放弃");
            session.waiting = false;
        }
    }

    /// 取走待处理结果
    pub fn take_pending(&self) -> Option<Outcome> {
        self.lock().pending.take()
    }

    pub fn is_waiting(&self) -> bool {
        self.lock().waiting
    }

    pub fn message(&self) -> String {
        self.lock().message.clone()
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.lock().message = message.into();
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let session = self.lock();
        StatusSnapshot {
            waiting: session.waiting,
            message: session.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn outcome(text: &str) -> Outcome {
        Outcome {
            recognition: Recognition::Recognized(text.to_string()),
            matched: MatchResult::NoMatch { similarity: 0.0 },
        }
    }

    #[test]
    fn test_begin_twice() {
        let state = SessionState::new("idle");
        assert!(state.try_begin());
        assert!(!state.try_begin());
        assert!(state.is_waiting());
        assert!(!state.snapshot().can_start(true));

        state.complete(outcome("hi"));
        assert!(!state.is_waiting());
        assert!(state.try_begin());
    }

    #[test]
    fn test_abandon_clears_waiting() {
        let state = SessionState::new("idle");
        assert!(state.try_begin());
        state.abandon();
        assert!(!state.is_waiting());
        assert_eq!(state.take_pending(), None);
        assert_eq!(state.message(), "idle");
        assert!(state.try_begin());
    }

    #[test]
    fn test_pending_drained_once() {
        let state = SessionState::new("idle");
        assert_eq!(state.take_pending(), None);

        state.try_begin();
        state.complete(outcome("hello"));
        assert_eq!(state.message(), "hello");
        assert_eq!(state.take_pending(), Some(outcome("hello")));
        assert_eq!(state.take_pending(), None);
        // 状态文本保留
        assert_eq!(state.message(), "hello");
    }

    #[test]
    fn test_stale_pending_replaced() {
        let state = SessionState::new("idle");
        state.complete(outcome("first"));
        state.complete(outcome("second"));
        assert_eq!(state.take_pending(), Some(outcome("second")));
        assert_eq!(state.take_pending(), None);
    }

    #[test]
    fn test_snapshot() {
        let state = SessionState::new("Click the button to recognize speech");
        state.set_message("ready");
        let snapshot = state.snapshot();
        assert_eq!(
            snapshot,
            StatusSnapshot {
                waiting: false,
                message: "ready".to_string()
            }
        );
        assert!(snapshot.can_start(true));
        assert!(!snapshot.can_start(false));
    }

    #[test]
    fn test_cross_thread_handoff() {
        let state = Arc::new(SessionState::new("idle"));
        assert!(state.try_begin());

        let worker = {
            let state = Arc::clone(&state);
            std::thread::spawn(move || state.complete(outcome("from worker")))
        };
        worker.join().unwrap();

        assert_eq!(
            state.take_pending().map(|o| o.recognition),
            Some(Recognition::Recognized("from worker".to_string()))
        );
        assert!(!state.is_waiting());
    }
}
