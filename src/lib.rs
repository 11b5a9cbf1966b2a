pub mod animation;
pub mod audio;
pub mod config;
pub mod error;
pub mod phrase_matcher;
pub mod pipeline;
pub mod recognizer;
pub mod session;

use animation::LogTrigger;
use config::load_config;
use phrase_matcher::PhraseMatcher;
use pipeline::VoicePipeline;
use recognizer::AzureRecognizer;
use std::path::Path;

pub use error::{Error, Result};

/// 识别一个 WAV 文件并触发匹配到的动画，返回最终状态文本
pub fn run(wav_path: &Path) -> Result<String> {
    env_logger::init();

    let config = load_config()?;
    let matcher = PhraseMatcher::with_phrases(config.phrases.clone())?;
    let pipeline = VoicePipeline::new(matcher, config.initial_message.clone());
    log::info!("已加载 {} 条短语", pipeline.matcher().len());

    let wav_bytes = audio::read_wav_file(wav_path)?;
    let mut trigger = LogTrigger::new();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match AzureRecognizer::new(&config.azure) {
            Ok(recognizer) => {
                log::info!("识别服务: {}", recognizer.url());
                pipeline.listen(&recognizer, wav_bytes).await;
            }
            Err(e) => {
                log::error!("创建识别客户端失败: {e}");
                pipeline.session().set_message(format!("错误: {e}"));
            }
        }
    });

    let status = pipeline.update(&mut trigger);
    Ok(status.message)
}
