//! 多轨引擎模块
//!
//! 实现 create/play/pause/zoom/set_track_volume/is_playing 能力契约，
//! 以及基于 rodio 的默认实现。销毁引擎实例就是 `Drop`。

use crate::audio::{self, SharedSamples, TrackSamples};
use crate::structure::{MultitrackOptions, TrackDescriptor};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultitrackError {
    #[error("无法初始化音频输出设备: {0}")]
    OutputDevice(#[from] rodio::StreamError),
    #[error("无法解码音轨 {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("无法创建播放通道: {0}")]
    Playback(#[from] rodio::PlayError),
}

/// 宿主可替换的多轨引擎抽象。
///
/// 宿主按轨道索引寻址；索引顺序与创建时的描述符顺序一致。
/// 越界索引是静默空操作。
pub trait MultitrackEngine {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    /// 设置缩放（像素/秒）。
    fn zoom(&mut self, px_per_sec: f32);
    /// 设置某条音轨的增益（0.0–1.0）。
    fn set_track_volume(&mut self, index: usize, volume: f32);
    /// 在给定区域绘制波形容器。
    fn ui(&mut self, ui: &mut egui::Ui);
}

/// 空实现，允许宿主禁用音频输出。
#[derive(Default)]
pub struct NullMultitrack;

impl MultitrackEngine for NullMultitrack {
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn is_playing(&self) -> bool {
        false
    }
    fn zoom(&mut self, _px_per_sec: f32) {}
    fn set_track_volume(&mut self, _index: usize, _volume: f32) {}
    fn ui(&mut self, _ui: &mut egui::Ui) {}
}

/// 引擎内部的单条音轨。
pub(crate) struct EngineTrack {
    pub descriptor: TrackDescriptor,
    /// 解码失败时为 None，槽位保留以维持索引一致。
    pub samples: Option<TrackSamples>,
    pub peaks: Vec<(f32, f32)>,
    pub seconds_per_bucket: f64,
    pub duration: f64,
    pub volume: f32,
    pub sink: Option<Sink>,
}

impl EngineTrack {
    /// 音轨在时间轴上的结束时间（秒）。
    fn end_time(&self) -> f64 {
        self.descriptor.start_position + self.duration
    }
}

/// 基于 rodio 的多轨波形引擎。
pub struct Multitrack {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    pub(crate) options: MultitrackOptions,
    pub(crate) tracks: Vec<EngineTrack>,
    pub(crate) zoom: f32,
    pub(crate) playing: bool,
    /// 播放光标位置（秒）。
    pub(crate) playhead: f64,
    pub(crate) last_update: f64,
}

impl Multitrack {
    /// 创建引擎实例并解码全部音轨。
    ///
    /// 解码失败的音轨只记录警告并保留空槽位，保证引擎索引
    /// 与描述符顺序无条件一致。
    pub fn create(
        descriptors: &[TrackDescriptor],
        options: MultitrackOptions,
    ) -> Result<Self, MultitrackError> {
        let (_stream, handle) = OutputStream::try_default()?;
        let zoom = options.min_px_per_sec;

        let mut tracks = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let track = match audio::decode(&descriptor.source) {
                Ok(samples) => {
                    let peaks = audio::build_peaks(
                        &samples.samples,
                        samples.channels,
                        descriptor.options.normalize,
                    );
                    let duration = samples.duration();
                    log::info!("已加载音轨 {} ({:.1}s)", descriptor.id, duration);
                    EngineTrack {
                        descriptor: descriptor.clone(),
                        seconds_per_bucket: samples.seconds_per_bucket(),
                        samples: Some(samples),
                        peaks,
                        duration,
                        volume: 1.0,
                        sink: None,
                    }
                }
                Err(err) => {
                    log::warn!("{err}");
                    EngineTrack {
                        descriptor: descriptor.clone(),
                        samples: None,
                        peaks: Vec::new(),
                        seconds_per_bucket: 0.0,
                        duration: 0.0,
                        volume: 1.0,
                        sink: None,
                    }
                }
            };
            tracks.push(track);
        }

        Ok(Self {
            _stream,
            handle,
            options,
            tracks,
            zoom,
            playing: false,
            playhead: 0.0,
            last_update: 0.0,
        })
    }

    /// 音轨数量（含解码失败的空槽位）。
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// 所有音轨的结束时间（秒）。
    pub(crate) fn total_duration(&self) -> f64 {
        self.tracks.iter().map(EngineTrack::end_time).fold(0.0, f64::max)
    }

    /// 跳转播放位置；播放中会就地重建声道。
    pub(crate) fn seek(&mut self, position: f64) {
        self.playhead = position.max(0.0).min(self.total_duration());
        if self.playing {
            if let Err(err) = self.rebuild_sinks() {
                log::warn!("跳转后无法继续播放: {err}");
                self.stop_sinks();
                self.playing = false;
            }
        }
    }

    /// 暂停状态下水平拖动音轨，调整其起始位置。
    pub(crate) fn shift_track(&mut self, index: usize, delta_seconds: f64) {
        if self.playing {
            return;
        }
        let drag_bounds = self.options.drag_bounds;
        if let Some(track) = self.tracks.get_mut(index) {
            if !track.descriptor.draggable {
                return;
            }
            let mut next = track.descriptor.start_position + delta_seconds;
            if drag_bounds {
                next = next.max(0.0);
            }
            track.descriptor.start_position = next;
        }
    }

    /// 从当前播放位置重建每条音轨的 Sink。
    fn rebuild_sinks(&mut self) -> Result<(), MultitrackError> {
        let playhead = self.playhead;
        for track in &mut self.tracks {
            track.sink = None;
            let Some(samples) = &track.samples else { continue };

            let offset = playhead - track.descriptor.start_position;
            let source = SharedSamples::new(samples);
            let sink = Sink::try_new(&self.handle)?;
            sink.set_volume(track.volume);
            if offset >= 0.0 {
                if offset >= track.duration {
                    // 这条音轨已经播完
                    continue;
                }
                sink.append(source.skipped_to(offset));
            } else {
                sink.append(source.delay(Duration::from_secs_f64(-offset)));
            }
            track.sink = Some(sink);
        }
        Ok(())
    }

    pub(crate) fn stop_sinks(&mut self) {
        for track in &mut self.tracks {
            if let Some(sink) = track.sink.take() {
                sink.stop();
            }
        }
    }
}

impl MultitrackEngine for Multitrack {
    fn play(&mut self) {
        if self.playing {
            return;
        }
        let total = self.total_duration();
        if self.playhead >= total {
            self.playhead = 0.0;
        }
        match self.rebuild_sinks() {
            Ok(()) => self.playing = true,
            Err(err) => {
                log::warn!("无法开始播放: {err}");
                self.stop_sinks();
            }
        }
    }

    fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.stop_sinks();
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn zoom(&mut self, px_per_sec: f32) {
        self.zoom = px_per_sec.max(1.0);
    }

    fn set_track_volume(&mut self, index: usize, volume: f32) {
        if let Some(track) = self.tracks.get_mut(index) {
            track.volume = volume.clamp(0.0, 1.0);
            if let Some(sink) = &track.sink {
                sink.set_volume(track.volume);
            }
        }
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        self.draw(ui);
    }
}
