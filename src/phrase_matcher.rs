use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 短语条目：识别文本 → 动画标识
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub phrase: String,
    #[serde(rename = "action")]
    pub action_id: String,
    /// 模糊匹配所需的最低相似度，[0, 1]
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_threshold() -> f32 {
    0.8
}

impl PhraseEntry {
    pub fn new(phrase: impl Into<String>, action_id: impl Into<String>, threshold: f32) -> Self {
        Self {
            phrase: phrase.into(),
            action_id: action_id.into(),
            threshold,
        }
    }
}

/// 匹配结果
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// 命中某个短语
    Matched {
        action_id: String,
        phrase: String,
        similarity: f32,
    },
    /// 未命中；similarity 为本次比较中的最高分，便于调阈值
    NoMatch { similarity: f32 },
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    pub fn action_id(&self) -> Option<&str> {
        match self {
            MatchResult::Matched { action_id, .. } => Some(action_id),
            MatchResult::NoMatch { .. } => None,
        }
    }

    pub fn matched_phrase(&self) -> Option<&str> {
        match self {
            MatchResult::Matched { phrase, .. } => Some(phrase),
            MatchResult::NoMatch { .. } => None,
        }
    }

    pub fn similarity(&self) -> f32 {
        match self {
            MatchResult::Matched { similarity, .. } | MatchResult::NoMatch { similarity } => {
                *similarity
            }
        }
    }
}

/// 已注册条目，短语在注册时预先归一化
#[derive(Debug, Clone)]
struct Registered {
    entry: PhraseEntry,
    normalized: String,
}

/// 短语模糊匹配器
///
/// 条目按注册顺序比较，第一个满足条件的条目胜出（不继续寻找更高分的条目）。
#[derive(Debug, Clone, Default)]
pub struct PhraseMatcher {
    entries: Vec<Registered>,
}

impl PhraseMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phrases(entries: Vec<PhraseEntry>) -> Result<Self> {
        let mut matcher = Self::new();
        matcher.register_phrases(entries)?;
        Ok(matcher)
    }

    /// 替换短语表。任一条目非法（阈值越界、归一化后为空）则整体拒绝，原表保持不变
    pub fn register_phrases(&mut self, entries: Vec<PhraseEntry>) -> Result<()> {
        let mut registered = Vec::with_capacity(entries.len());
        for entry in entries {
            if !(0.0..=1.0).contains(&entry.threshold) {
                return Err(Error::InvalidThreshold {
                    phrase: entry.phrase,
                    threshold: entry.threshold,
                });
            }
            let normalized = normalize(&entry.phrase);
            if normalized.is_empty() {
                return Err(Error::EmptyPhrase {
                    phrase: entry.phrase,
                    action_id: entry.action_id,
                });
            }
            registered.push(Registered { entry, normalized });
        }

        self.entries = registered;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn phrases(&self) -> impl Iterator<Item = &PhraseEntry> {
        self.entries.iter().map(|r| &r.entry)
    }

    /// 识别结果可能缺失（无语音 / 被取消），缺失即未命中
    pub fn match_transcript(&self, transcript: Option<&str>) -> MatchResult {
        match transcript {
            Some(text) => self.match_text(text),
            None => MatchResult::NoMatch { similarity: 0.0 },
        }
    }

    pub fn match_text(&self, text: &str) -> MatchResult {
        if text.is_empty() {
            return MatchResult::NoMatch { similarity: 0.0 };
        }

        let input = normalize(text);
        let mut best: Option<(&Registered, f32)> = None;
        for registered in &self.entries {
            if input == registered.normalized {
                return matched(&registered.entry, 1.0);
            }

            let score = similarity(&input, &registered.normalized);
            if score >= registered.entry.threshold {
                return matched(&registered.entry, score);
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((registered, score));
            }
        }

        match best {
            Some((nearest, score)) => {
                log::debug!(
                    "未匹配: \"{input}\"，最接近 \"{}\" ({score:.3} < {})",
                    nearest.entry.phrase,
                    nearest.entry.threshold
                );
                MatchResult::NoMatch { similarity: score }
            }
            None => {
                log::debug!("未匹配: \"{input}\"，短语表为空");
                MatchResult::NoMatch { similarity: 0.0 }
            }
        }
    }
}

fn matched(entry: &PhraseEntry, similarity: f32) -> MatchResult {
    MatchResult::Matched {
        action_id: entry.action_id.clone(),
        phrase: entry.phrase.clone(),
        similarity,
    }
}

/// 小写、去标点、去首尾空白。内部连续空白保持原样，不做合并
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// 基于编辑距离的相似度，[0, 1]
pub fn similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    // 只做一次除法，1 - d/n 恰好等于阈值时不会因舍入落到阈值之下
    (max_len - edit_distance(a, b)) as f32 / max_len as f32
}

/// Levenshtein 距离（按 char 计），两行滚动数组
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0; short.len() + 1];
    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = if lc == sc { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}
