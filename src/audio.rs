use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// 识别服务默认采样率
pub const SAMPLE_RATE: u32 = 16000;
/// 识别服务接受的采样率
pub const SUPPORTED_SAMPLE_RATES: [u32; 2] = [8000, 16000];

/// 将单声道 f32 PCM 编码为 16-bit WAV bytes
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Err(Error::EmptyAudio);
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            // f32 [-1.0, 1.0] → i16
            let s = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer.write_sample(s)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// 读取 WAV 文件。单声道 16-bit PCM 原样返回，其余格式转为单声道 16-bit；
/// 采样率必须是识别服务支持的值
pub fn read_wav_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path.as_ref())?;
    let mut reader = WavReader::new(Cursor::new(bytes.clone()))?;
    let spec = reader.spec();
    if reader.len() == 0 {
        return Err(Error::EmptyAudio);
    }
    if !SUPPORTED_SAMPLE_RATES.contains(&spec.sample_rate) {
        return Err(Error::UnsupportedSampleRate(spec.sample_rate));
    }
    if spec.channels == 1 && spec.bits_per_sample == 16 && spec.sample_format == SampleFormat::Int
    {
        return Ok(bytes);
    }

    log::info!(
        "WAV 为 {} 声道 / {}-bit，转换为单声道 16-bit",
        spec.channels,
        spec.bits_per_sample
    );
    let samples = read_samples(&mut reader)?;
    encode_wav(&downmix(&samples, spec.channels), spec.sample_rate)
}

/// 读出全部样本，归一化到 [-1.0, 1.0]
fn read_samples<R: Read>(reader: &mut WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, hound::Error>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<f32>, hound::Error>>()?
        }
    };
    Ok(samples)
}

/// 多声道转单声道
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels as usize)
        .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav() {
        let samples = [0.0, 0.5, -0.5, 2.0, -2.0];
        let wav = encode_wav(&samples, SAMPLE_RATE).unwrap();

        let mut reader = WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![0, 16383, -16383, 32767, -32768]);
    }

    #[test]
    fn test_encode_empty() {
        assert!(matches!(encode_wav(&[], SAMPLE_RATE), Err(Error::EmptyAudio)));
    }

    #[test]
    fn test_read_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.wav");
        let wav = encode_wav(&[0.1; 160], SAMPLE_RATE).unwrap();
        std::fs::write(&path, &wav).unwrap();

        assert_eq!(read_wav_file(&path).unwrap(), wav);
    }

    #[test]
    fn test_read_stereo_wav_file_downmixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let wav = read_wav_file(&path).unwrap();
        let mut reader = WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 8000);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), 100);
        // (0.5 + 0.0) / 2 = 0.25
        assert!(decoded.iter().all(|&s| s == 8191));
    }

    #[test]
    fn test_read_unsupported_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cd.wav");
        std::fs::write(&path, encode_wav(&[0.1; 441], 44100).unwrap()).unwrap();

        assert!(matches!(
            read_wav_file(&path),
            Err(Error::UnsupportedSampleRate(44100))
        ));
    }

    #[test]
    fn test_read_invalid_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"not a wav").unwrap();

        assert!(matches!(read_wav_file(&path), Err(Error::Audio(_))));
        assert!(matches!(
            read_wav_file(dir.path().join("missing.wav")),
            Err(Error::Io(_))
        ));
    }
}
