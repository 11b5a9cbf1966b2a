/// 动画触发器，接收动画标识
pub trait AnimationTrigger {
    fn trigger(&mut self, action_id: &str);
}

/// 只写日志的触发器，记录触发过的动画
#[derive(Debug, Default)]
pub struct LogTrigger {
    pub fired: Vec<String>,
}

impl LogTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.fired.last().map(String::as_str)
    }
}

impl AnimationTrigger for LogTrigger {
    fn trigger(&mut self, action_id: &str) {
        log::info!("触发动画: {action_id}");
        self.fired.push(action_id.to_string());
    }
}
