//! 多轨波形播放器示例应用
//!
//! 组合文件导入、音轨状态存储、控制面板和波形容器，
//! 并持有引擎实例的生命周期（创建工厂、随存储一起销毁重建）。

mod control_panel;
mod hotkeys;
mod intake;
mod store;

use control_panel::{ControlPanel, PlayerCommand, DEFAULT_ZOOM};
use eframe::egui;
use egui_multitrack::{Multitrack, MultitrackEngine, MultitrackOptions};
use hotkeys::HotkeyBinder;
use intake::FileIntake;
use store::{EngineFactory, TrackStateStore};

fn main() -> eframe::Result<()> {
    // 配置日志：默认级别 info，输出到 stderr
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Multitrack Player",
        native_options,
        Box::new(|_cc| Ok(Box::new(MultitrackPlayerApp::new()))),
    )
}

struct MultitrackPlayerApp {
    store: TrackStateStore,
    intake: FileIntake,
    hotkeys: HotkeyBinder,
}

impl MultitrackPlayerApp {
    fn new() -> Self {
        let factory: EngineFactory = Box::new(|descriptors, options| {
            Multitrack::create(descriptors, options)
                .map(|engine| Box::new(engine) as Box<dyn MultitrackEngine>)
        });

        let mut options = MultitrackOptions::default();
        options.min_px_per_sec = DEFAULT_ZOOM;

        Self {
            store: TrackStateStore::new(factory, options),
            intake: FileIntake::new(),
            hotkeys: HotkeyBinder::new(vec![egui::Key::Space, egui::Key::Enter]),
        }
    }

    fn execute_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::PlayPause => self.store.play_pause(),
            PlayerCommand::SetZoom { level } => self.store.set_zoom(level),
            PlayerCommand::SetTrackVolume { track_id, volume } => {
                self.store.set_volume(&track_id, volume);
            }
            PlayerCommand::ToggleTrackMute { track_id } => self.store.toggle_mute(&track_id),
        }
    }

    fn add_tracks_via_picker(&mut self) {
        let descriptors = self.intake.trigger_picker();
        if !descriptors.is_empty() {
            self.store.merge_tracks(descriptors);
        }
    }
}

impl eframe::App for MultitrackPlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dropped = self.intake.poll(ctx);
        if !dropped.is_empty() {
            self.store.merge_tracks(dropped);
        }

        if self.hotkeys.triggered(ctx) {
            self.store.play_pause();
        }

        // 引擎可能在播放到结尾时自行停止
        self.store.refresh_playing();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Multitrack Player");
                if self.intake.drag_active() {
                    ui.label("Drop your audio files here");
                }
                if self.intake.rejection_active() {
                    ui.colored_label(egui::Color32::RED, "Only audio files are allowed");
                    // 提示靠时间熄灭，没有输入时也要刷新
                    ctx.request_repaint_after(std::time::Duration::from_millis(100));
                }
            });

            if self.store.has_tracks() {
                let mut panel = ControlPanel::new(self.store.is_playing(), self.store.zoom());
                let mut commands = Vec::new();
                panel.ui(ui, self.store.tracks(), &mut |command| commands.push(command));
                for command in commands {
                    self.execute_command(command);
                }
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.store.has_tracks() {
                self.store.engine_ui(ui);
                ui.separator();
                if ui.button("Add more tracks").clicked() {
                    self.add_tracks_via_picker();
                }
            } else {
                // 上传提示：只在没有任何音轨时显示
                ui.vertical_centered(|ui| {
                    ui.add_space(80.0);
                    ui.heading("Drop your audio files");
                    ui.label("or");
                    if ui.button("Click here to upload audio").clicked() {
                        self.add_tracks_via_picker();
                    }
                    ui.add_space(8.0);
                    ui.label("Supported formats: mp3, wav, ogg, flac");
                });
            }
        });
    }
}
