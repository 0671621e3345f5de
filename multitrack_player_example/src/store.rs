//! 音轨状态存储模块
//!
//! 维护有序的音轨状态列表，并保证它与外部引擎实例的轨道索引一一对应。
//! 所有 UI 意图先落到本地状态，再按索引转发给引擎；引擎重建时
//! 既有音轨的索引保持不变，新音轨追加在末尾。

use egui_multitrack::{MultitrackEngine, MultitrackError, MultitrackOptions, TrackDescriptor};

/// 引擎工厂：用完整的描述符列表创建一个新的引擎实例。
///
/// 存储在重建前总是先丢弃旧实例，同一时刻最多只有一个引擎存在。
pub type EngineFactory = Box<
    dyn FnMut(
        &[TrackDescriptor],
        MultitrackOptions,
    ) -> Result<Box<dyn MultitrackEngine>, MultitrackError>,
>;

/// 单条音轨的本地状态。
#[derive(Clone)]
pub struct TrackState {
    /// 与描述符相同的唯一 id。
    pub id: String,
    /// 存储的音量（0.0–1.0），静音不会覆盖它。
    pub volume: f32,
    pub is_muted: bool,
    pub descriptor: TrackDescriptor,
}

impl TrackState {
    fn new(descriptor: TrackDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            volume: 1.0,
            is_muted: false,
            descriptor,
        }
    }

    /// 实际发送给引擎的有效音量：静音时为 0，否则为存储的音量。
    pub fn effective_volume(&self) -> f32 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }
}

pub struct TrackStateStore {
    tracks: Vec<TrackState>,
    engine: Option<Box<dyn MultitrackEngine>>,
    factory: EngineFactory,
    options: MultitrackOptions,
    is_playing: bool,
    zoom: f32,
}

impl TrackStateStore {
    pub fn new(factory: EngineFactory, options: MultitrackOptions) -> Self {
        let zoom = options.min_px_per_sec;
        Self {
            tracks: Vec::new(),
            engine: None,
            factory,
            options,
            is_playing: false,
            zoom,
        }
    }

    pub fn tracks(&self) -> &[TrackState] {
        &self.tracks
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// 合并新音轨：先销毁旧引擎，再用全部描述符重建。
    ///
    /// 重建必然停止播放。既有音轨的状态和索引保持不变，新音轨
    /// 以默认状态（音量 1、未静音）追加在末尾。工厂失败时整个
    /// 操作退化为无副作用（引擎为空，列表不变）。
    pub fn merge_tracks(&mut self, new_descriptors: Vec<TrackDescriptor>) {
        if new_descriptors.is_empty() {
            return;
        }

        let mut all: Vec<TrackDescriptor> =
            self.tracks.iter().map(|t| t.descriptor.clone()).collect();
        all.extend(new_descriptors.iter().cloned());

        // 先销毁，后创建
        self.engine = None;
        self.is_playing = false;

        let mut options = self.options.clone();
        options.min_px_per_sec = self.zoom;
        match (self.factory)(&all, options) {
            Ok(mut engine) => {
                // 重建把引擎内所有增益重置为 1.0，这里按不变的索引
                // 重新应用既有音轨的有效音量
                for (index, track) in self.tracks.iter().enumerate() {
                    engine.set_track_volume(index, track.effective_volume());
                }
                self.engine = Some(engine);
                self.tracks
                    .extend(new_descriptors.into_iter().map(TrackState::new));
            }
            Err(err) => {
                log::error!("重建引擎失败: {err}");
            }
        }
    }

    /// 设置某条音轨的音量。未知 id 或没有引擎时静默忽略；不改变静音标志。
    pub fn set_volume(&mut self, track_id: &str, volume: f32) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let Some(index) = self.tracks.iter().position(|t| t.id == track_id) else {
            return;
        };
        let track = &mut self.tracks[index];
        track.volume = volume.clamp(0.0, 1.0);
        engine.set_track_volume(index, track.effective_volume());
    }

    /// 切换静音。先翻转标志，再按翻转后的状态推导有效音量。
    pub fn toggle_mute(&mut self, track_id: &str) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let Some(index) = self.tracks.iter().position(|t| t.id == track_id) else {
            return;
        };
        let track = &mut self.tracks[index];
        track.is_muted = !track.is_muted;
        engine.set_track_volume(index, track.effective_volume());
    }

    /// 全局播放/暂停。没有音轨时不触碰引擎，播放状态保持 false。
    pub fn play_pause(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if engine.is_playing() {
            engine.pause();
        } else {
            engine.play();
        }
        self.is_playing = engine.is_playing();
    }

    /// 设置缩放。数值同时保存在本地，供下一次引擎重建使用。
    pub fn set_zoom(&mut self, level: f32) {
        self.zoom = level;
        if let Some(engine) = self.engine.as_mut() {
            engine.zoom(level);
        }
    }

    /// 每帧调用：把引擎上报的播放状态镜像到本地。
    /// 引擎可能在播放到结尾时自行停止。
    pub fn refresh_playing(&mut self) {
        self.is_playing = self
            .engine
            .as_ref()
            .map(|engine| engine.is_playing())
            .unwrap_or(false);
    }

    /// 把波形容器区域交给引擎绘制。
    pub fn engine_ui(&mut self, ui: &mut egui::Ui) {
        if let Some(engine) = self.engine.as_mut() {
            engine.ui(ui);
        }
    }
}
