use hound::WavReader;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::io::Cursor;
use std::time::Duration;

use crate::config::AzureConfig;

/// 取消原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    Error,
    EndOfStream,
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancellationReason::Error => f.write_str("Error"),
            CancellationReason::EndOfStream => f.write_str("EndOfStream"),
        }
    }
}

/// 一次识别的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    /// 识别出文本
    Recognized(String),
    /// 有声音但无法识别
    NoMatch,
    /// 识别被取消（网络错误、服务错误等）
    Canceled {
        reason: CancellationReason,
        details: String,
    },
}

impl Recognition {
    pub fn transcript(&self) -> Option<&str> {
        match self {
            Recognition::Recognized(text) => Some(text),
            _ => None,
        }
    }

    /// 显示给用户的状态文本
    pub fn status_message(&self) -> String {
        match self {
            Recognition::Recognized(text) => text.clone(),
            Recognition::NoMatch => "NOMATCH: Speech could not be recognized.".to_string(),
            Recognition::Canceled { reason, details } => {
                format!("CANCELED: Reason={reason} ErrorDetails={details}")
            }
        }
    }

    fn canceled(details: impl Into<String>) -> Self {
        Recognition::Canceled {
            reason: CancellationReason::Error,
            details: details.into(),
        }
    }
}

/// 语音识别能力：输入一段 WAV，异步产出一次识别结果。
///
/// 失败不以 `Err` 返回，而是 [`Recognition::Canceled`]。
pub trait SpeechRecognizer {
    fn recognize_once(&self, wav_bytes: Vec<u8>) -> impl Future<Output = Recognition> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AzureResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: Option<String>,
}

/// Azure Speech 短音频 REST 接口
pub struct AzureRecognizer {
    client: reqwest::Client,
    url: String,
    subscription_key: String,
}

impl AzureRecognizer {
    pub fn new(config: &AzureConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: endpoint_url(config),
            subscription_key: config.subscription_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SpeechRecognizer for AzureRecognizer {
    async fn recognize_once(&self, wav_bytes: Vec<u8>) -> Recognition {
        let content_type = match content_type(&wav_bytes) {
            Ok(ct) => ct,
            Err(e) => {
                log::error!("WAV 数据无效: {e}");
                return Recognition::canceled(format!("WAV 数据无效: {e}"));
            }
        };

        let resp = match self
            .client
            .post(&self.url)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::ACCEPT, "application/json")
            .body(wav_bytes)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("识别请求失败: {e}");
                return Recognition::canceled(format!("请求失败: {e}"));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            log::error!("识别服务返回错误状态: {status}");
            return Recognition::canceled(format!("HTTP {status}"));
        }

        match resp.text().await {
            Ok(body) => parse_response(&body),
            Err(e) => Recognition::canceled(format!("读取响应失败: {e}")),
        }
    }
}

/// 按 WAV 头中的实际采样率生成 Content-Type
fn content_type(wav_bytes: &[u8]) -> Result<String, hound::Error> {
    let spec = WavReader::new(Cursor::new(wav_bytes))?.spec();
    Ok(format!(
        "audio/wav; codecs=audio/pcm; samplerate={}",
        spec.sample_rate
    ))
}

fn endpoint_url(config: &AzureConfig) -> String {
    let base = match &config.endpoint {
        Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
        None => format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
            config.region
        ),
    };
    format!("{base}?language={}&format=simple", config.language)
}

/// 解析识别服务的 JSON 响应
pub fn parse_response(body: &str) -> Recognition {
    let resp: AzureResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return Recognition::canceled(format!("解析识别响应失败: {e}")),
    };

    match resp.recognition_status.as_str() {
        "Success" => match resp.display_text {
            Some(text) if !text.trim().is_empty() => Recognition::Recognized(text),
            _ => Recognition::NoMatch,
        },
        "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => Recognition::NoMatch,
        "EndOfDictation" => Recognition::Canceled {
            reason: CancellationReason::EndOfStream,
            details: "EndOfDictation".to_string(),
        },
        other => Recognition::canceled(other),
    }
}
