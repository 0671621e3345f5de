//! 音频解码与波形峰值模块
//!
//! 把共享字节缓冲解码为采样，折叠出绘制用的 (min, max) 峰值桶，
//! 并提供一个可以从任意时间偏移开始播放的 rodio 源。

use crate::engine::MultitrackError;
use crate::structure::TrackSource;
use rodio::{Decoder, Source};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// 每个峰值桶覆盖的帧数（44.1kHz 下约 86 桶/秒）。
pub const PEAK_FRAMES: usize = 512;

/// 解码后的音轨采样，在绘制和多次播放之间共享。
#[derive(Clone)]
pub struct TrackSamples {
    /// 交错的 f32 采样。
    pub samples: Arc<Vec<f32>>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl TrackSamples {
    /// 音轨时长（秒）。
    pub fn duration(&self) -> f64 {
        if self.channels == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        let frames = self.samples.len() / self.channels as usize;
        frames as f64 / self.sample_rate as f64
    }

    /// 每个峰值桶覆盖的时长（秒）。
    pub fn seconds_per_bucket(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        PEAK_FRAMES as f64 / self.sample_rate as f64
    }
}

/// 解码音轨来源的全部采样。
pub fn decode(source: &TrackSource) -> Result<TrackSamples, MultitrackError> {
    let cursor = Cursor::new(source.bytes.clone());
    let decoder = Decoder::new(cursor).map_err(|err| MultitrackError::Decode {
        name: source.name.clone(),
        source: err,
    })?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.convert_samples().collect();
    Ok(TrackSamples {
        samples: Arc::new(samples),
        channels,
        sample_rate,
    })
}

/// 把交错采样折叠为 (min, max) 峰值桶序列。
///
/// 每个桶覆盖 [`PEAK_FRAMES`] 帧；`normalize` 为真时按最大绝对值把峰值
/// 缩放到满幅。
pub fn build_peaks(samples: &[f32], channels: u16, normalize: bool) -> Vec<(f32, f32)> {
    let channels = channels.max(1) as usize;
    let chunk_len = PEAK_FRAMES * channels;
    let mut peaks: Vec<(f32, f32)> = samples
        .chunks(chunk_len)
        .map(|chunk| {
            let mut lo = f32::MAX;
            let mut hi = f32::MIN;
            for &sample in chunk {
                lo = lo.min(sample);
                hi = hi.max(sample);
            }
            (lo, hi)
        })
        .collect();

    if normalize {
        let max_abs = peaks
            .iter()
            .map(|&(lo, hi)| lo.abs().max(hi.abs()))
            .fold(0.0f32, f32::max);
        if max_abs > 1e-6 {
            let scale = 1.0 / max_abs;
            for peak in &mut peaks {
                peak.0 *= scale;
                peak.1 *= scale;
            }
        }
    }

    peaks
}

/// 基于共享采样缓冲的 rodio 源。
///
/// 不复制采样数据，同一条音轨的每次播放只推进自己的读取位置。
pub struct SharedSamples {
    samples: Arc<Vec<f32>>,
    channels: u16,
    sample_rate: u32,
    position: usize,
}

impl SharedSamples {
    pub fn new(track: &TrackSamples) -> Self {
        Self {
            samples: track.samples.clone(),
            channels: track.channels.max(1),
            sample_rate: track.sample_rate.max(1),
            position: 0,
        }
    }

    /// 从指定时间偏移（秒）开始播放，按帧对齐。
    pub fn skipped_to(mut self, seconds: f64) -> Self {
        let frame = (seconds.max(0.0) * self.sample_rate as f64) as usize;
        self.position = (frame * self.channels as usize).min(self.samples.len());
        self
    }
}

impl Iterator for SharedSamples {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.samples.get(self.position).copied();
        self.position += 1;
        sample
    }
}

impl Source for SharedSamples {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        let frames = self.samples.len() / self.channels as usize;
        Some(Duration::from_secs_f64(frames as f64 / self.sample_rate as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一个最小的 16-bit 单声道 WAV 文件。
    fn tiny_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn decode_tiny_wav() {
        let source = TrackSource::new("tiny.wav", tiny_wav(&[0, 16384, -16384, 0], 8000));
        let decoded = decode(&source).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples.len(), 4);
        assert!((decoded.samples[1] - 0.5).abs() < 1e-3);
        assert!((decoded.samples[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn decode_rejects_non_audio_bytes() {
        let source = TrackSource::new("notes.txt", b"definitely not audio".to_vec());
        assert!(decode(&source).is_err());
    }

    #[test]
    fn peaks_bucket_count_and_order() {
        // 两个整桶加一个零头
        let samples = vec![0.25f32; PEAK_FRAMES * 2 + 10];
        let peaks = build_peaks(&samples, 1, false);
        assert_eq!(peaks.len(), 3);
        for &(lo, hi) in &peaks {
            assert!(lo <= hi);
            assert_eq!(lo, 0.25);
            assert_eq!(hi, 0.25);
        }
    }

    #[test]
    fn peaks_track_min_and_max() {
        let mut samples = vec![0.0f32; PEAK_FRAMES];
        samples[3] = 0.8;
        samples[7] = -0.4;
        let peaks = build_peaks(&samples, 1, false);
        assert_eq!(peaks, vec![(-0.4, 0.8)]);
    }

    #[test]
    fn normalize_scales_to_full_scale() {
        let samples = vec![0.5f32; PEAK_FRAMES];
        let peaks = build_peaks(&samples, 1, true);
        assert!((peaks[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_silence_alone() {
        let samples = vec![0.0f32; PEAK_FRAMES];
        let peaks = build_peaks(&samples, 1, true);
        assert_eq!(peaks, vec![(0.0, 0.0)]);
    }

    #[test]
    fn empty_samples_give_no_peaks() {
        assert!(build_peaks(&[], 2, true).is_empty());
    }

    #[test]
    fn shared_samples_skips_by_frames() {
        let track = TrackSamples {
            samples: Arc::new((0..16).map(|i| i as f32).collect()),
            channels: 2,
            sample_rate: 4,
        };
        assert_eq!(track.duration(), 2.0);

        // 1 秒 = 4 帧 = 8 个交错采样
        let source = SharedSamples::new(&track).skipped_to(1.0);
        let rest: Vec<f32> = source.collect();
        assert_eq!(rest.len(), 8);
        assert_eq!(rest[0], 8.0);
    }

    #[test]
    fn shared_samples_skip_past_end_is_empty() {
        let track = TrackSamples {
            samples: Arc::new(vec![0.0; 8]),
            channels: 2,
            sample_rate: 4,
        };
        let source = SharedSamples::new(&track).skipped_to(100.0);
        assert_eq!(source.count(), 0);
    }
}
