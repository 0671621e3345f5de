//! 控制面板模块
//!
//! 渲染全局播放/缩放控件和每条音轨的静音按钮、音量滑块。
//! 纯展示组件：自身不持有状态，所有交互通过命令回调转发给宿主。

use crate::store::TrackState;
use egui::*;

/// 默认缩放（像素/秒）。
pub const DEFAULT_ZOOM: f32 = 10.0;
/// 缩放滑块范围。
pub const MIN_ZOOM: f32 = 5.0;
pub const MAX_ZOOM: f32 = 100.0;

/// 控制面板发出的用户意图。
#[derive(Clone, Debug)]
pub enum PlayerCommand {
    PlayPause,
    SetZoom { level: f32 },
    SetTrackVolume { track_id: String, volume: f32 },
    ToggleTrackMute { track_id: String },
}

pub struct ControlPanel {
    is_playing: bool,
    zoom: f32,
    show_per_track_controls: bool,
}

impl ControlPanel {
    pub fn new(is_playing: bool, zoom: f32) -> Self {
        Self {
            is_playing,
            zoom,
            show_per_track_controls: true,
        }
    }

    #[allow(dead_code)]
    pub fn set_show_per_track_controls(&mut self, show: bool) {
        self.show_per_track_controls = show;
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        tracks: &[TrackState],
        command_callback: &mut dyn FnMut(PlayerCommand),
    ) {
        // 全局传输控件
        ui.horizontal(|ui| {
            if ui
                .button(if self.is_playing { "⏸ Pause" } else { "▶ Play" })
                .clicked()
            {
                command_callback(PlayerCommand::PlayPause);
            }

            ui.separator();

            ui.label("🔍");
            let mut zoom = self.zoom;
            if ui
                .add(Slider::new(&mut zoom, MIN_ZOOM..=MAX_ZOOM).text("Zoom"))
                .changed()
            {
                command_callback(PlayerCommand::SetZoom { level: zoom });
            }
        });

        if !self.show_per_track_controls || tracks.is_empty() {
            return;
        }

        ui.separator();

        for track in tracks {
            ui.horizontal(|ui| {
                // 静音按钮（选中态表示已静音）
                let mute_icon = if track.is_muted { "🔇" } else { "🔊" };
                if ui.selectable_label(track.is_muted, mute_icon).clicked() {
                    command_callback(PlayerCommand::ToggleTrackMute {
                        track_id: track.id.clone(),
                    });
                }

                // 音量滑块 0–100：静音时显示 0，拖动仍会更新存储的音量
                let mut volume_pct = if track.is_muted {
                    0.0
                } else {
                    (track.volume * 100.0).round()
                };
                if ui
                    .add(Slider::new(&mut volume_pct, 0.0..=100.0).text("Vol"))
                    .changed()
                {
                    command_callback(PlayerCommand::SetTrackVolume {
                        track_id: track.id.clone(),
                        volume: volume_pct / 100.0,
                    });
                }

                ui.label(&track.descriptor.source.name);
            });
        }
    }
}
