use std::sync::Arc;

use crate::animation::AnimationTrigger;
use crate::phrase_matcher::{MatchResult, PhraseMatcher};
use crate::recognizer::SpeechRecognizer;
use crate::session::{Outcome, SessionState, StatusSnapshot};

/// 识别 → 匹配 → 触发动画
///
/// `listen` 可在后台任务中运行，`update` 在主循环中每帧调用一次。
#[derive(Debug, Clone)]
pub struct VoicePipeline {
    matcher: Arc<PhraseMatcher>,
    session: Arc<SessionState>,
}

impl VoicePipeline {
    pub fn new(matcher: PhraseMatcher, initial_message: impl Into<String>) -> Self {
        Self {
            matcher: Arc::new(matcher),
            session: Arc::new(SessionState::new(initial_message)),
        }
    }

    pub fn matcher(&self) -> &PhraseMatcher {
        &self.matcher
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// 识别一段语音并匹配短语，结果交给 `update` 处理。
    /// 已有识别进行中时直接返回 false。future 中途被丢弃时会清除等待状态
    pub async fn listen<R: SpeechRecognizer>(&self, recognizer: &R, wav_bytes: Vec<u8>) -> bool {
        if !self.session.try_begin() {
            log::warn!("识别进行中，忽略本次请求");
            return false;
        }
        let in_flight = InFlight {
            session: &self.session,
            finished: false,
        };

        let recognition = recognizer.recognize_once(wav_bytes).await;
        let matched = match recognition.transcript() {
            Some(text) => self.matcher.match_text(text),
            None => MatchResult::NoMatch { similarity: 0.0 },
        };

        match &matched {
            MatchResult::Matched {
                action_id,
                similarity,
                ..
            } => log::info!(
                "语音指令: {} → {action_id} ({similarity:.2})",
                recognition.status_message()
            ),
            MatchResult::NoMatch { .. } => {
                log::info!("未匹配: {}", recognition.status_message())
            }
        }

        in_flight.finish(Outcome {
            recognition,
            matched,
        });
        true
    }

    /// 处理待处理结果并返回当前状态
    pub fn update<A: AnimationTrigger>(&self, trigger: &mut A) -> StatusSnapshot {
        if let Some(outcome) = self.session.take_pending() {
            if let Some(action_id) = outcome.matched.action_id() {
                trigger.trigger(action_id);
            }
        }
        self.session.snapshot()
    }
}

/// 进行中的识别；未正常结束就被丢弃时放弃本次识别
struct InFlight<'a> {
    session: &'a SessionState,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(mut self, outcome: Outcome) {
        self.finished = true;
        self.session.complete(outcome);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.session.abandon();
        }
    }
}
