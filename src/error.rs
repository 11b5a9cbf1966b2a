use std::path::PathBuf;

/// 统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("短语 \"{phrase}\" 的阈值 {threshold} 不在 [0, 1] 范围内")]
    InvalidThreshold { phrase: String, threshold: f32 },

    #[error("动作 \"{action_id}\" 的短语 \"{phrase}\" 归一化后为空")]
    EmptyPhrase { phrase: String, action_id: String },

    #[error("读取配置失败 {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("解析配置失败: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("序列化配置失败: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("写入配置失败 {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("WAV 处理失败: {0}")]
    Audio(#[from] hound::Error),

    #[error("录音数据为空")]
    EmptyAudio,

    #[error("不支持的采样率 {0}Hz，仅支持 8000Hz / 16000Hz")]
    UnsupportedSampleRate(u32),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
