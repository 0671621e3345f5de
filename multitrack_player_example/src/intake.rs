//! 文件导入模块
//!
//! 把 egui 的文件拖放和 rfd 文件选择对话框桥接为音轨描述符。
//! 只接受音频扩展名；被拒绝的拖放会短暂亮起提示标志，1 秒后自动熄灭。

use egui_multitrack::{RenderOptions, TrackDescriptor, TrackSource};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// 接受的音频扩展名（与 rodio 默认解码器一致）。
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// 拒绝提示的显示时长。
const REJECTED_FLASH: Duration = Duration::from_secs(1);

static TRACK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

pub struct FileIntake {
    drag_active: bool,
    rejected_at: Option<Instant>,
}

impl FileIntake {
    pub fn new() -> Self {
        Self {
            drag_active: false,
            rejected_at: None,
        }
    }

    /// 每帧轮询拖放输入，返回本帧新产生的描述符。
    pub fn poll(&mut self, ctx: &egui::Context) -> Vec<TrackDescriptor> {
        self.drag_active = ctx.input(|i| !i.raw.hovered_files.is_empty());

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return Vec::new();
        }
        self.drag_active = false;

        let mut descriptors = Vec::new();
        for file in &dropped {
            match Self::load_dropped(file) {
                Some(source) => descriptors.push(make_descriptor(source)),
                None => self.mark_rejected(),
            }
        }
        descriptors
    }

    /// 读取一个拖放条目。Web 端自带字节，桌面端从路径读取。
    fn load_dropped(file: &egui::DroppedFile) -> Option<TrackSource> {
        if let Some(bytes) = &file.bytes {
            if !is_audio_name(&file.name) {
                return None;
            }
            return Some(TrackSource::new(file.name.clone(), bytes.clone()));
        }

        let path = file.path.as_deref()?;
        if !is_audio_path(path) {
            return None;
        }
        Self::load_path(path)
    }

    fn load_path(path: &Path) -> Option<TrackSource> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        match std::fs::read(path) {
            Ok(bytes) => Some(TrackSource::new(name, bytes)),
            Err(err) => {
                log::warn!("无法读取 {}: {err}", path.display());
                None
            }
        }
    }

    /// 打开系统文件选择对话框。
    /// "点击上传"和"添加更多音轨"共用这个入口。
    pub fn trigger_picker(&mut self) -> Vec<TrackDescriptor> {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("Audio", AUDIO_EXTENSIONS)
            .pick_files()
        else {
            return Vec::new();
        };

        let mut descriptors = Vec::new();
        for path in paths {
            if !is_audio_path(&path) {
                self.mark_rejected();
                continue;
            }
            match Self::load_path(&path) {
                Some(source) => descriptors.push(make_descriptor(source)),
                None => self.mark_rejected(),
            }
        }
        descriptors
    }

    /// 当前是否有文件悬停在窗口上方。
    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    /// 拒绝提示是否仍在显示；超时后自动清除。
    pub fn rejection_active(&mut self) -> bool {
        self.rejection_active_at(Instant::now())
    }

    fn rejection_active_at(&mut self, now: Instant) -> bool {
        match self.rejected_at {
            Some(at) if now.duration_since(at) < REJECTED_FLASH => true,
            Some(_) => {
                self.rejected_at = None;
                false
            }
            None => false,
        }
    }

    fn mark_rejected(&mut self) {
        self.rejected_at = Some(Instant::now());
    }
}

fn is_audio_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn is_audio_name(name: &str) -> bool {
    is_audio_path(Path::new(name))
}

/// 生成音轨 id：文件名 + 创建时间戳（毫秒）+ 进程内计数器。
/// 同名文件在同一毫秒内重复导入也会得到不同的 id。
fn make_track_id(name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let serial = TRACK_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{name}-{millis}-{serial}")
}

fn make_descriptor(source: TrackSource) -> TrackDescriptor {
    TrackDescriptor {
        id: make_track_id(&source.name),
        source,
        start_position: 0.0,
        draggable: true,
        options: RenderOptions::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn audio_extensions_are_accepted_case_insensitively() {
        assert!(is_audio_path(Path::new("kick.wav")));
        assert!(is_audio_path(Path::new("Loop.MP3")));
        assert!(is_audio_path(Path::new("/tmp/pad.flac")));
        assert!(!is_audio_path(Path::new("notes.txt")));
        assert!(!is_audio_path(Path::new("noextension")));
    }

    #[test]
    fn same_name_gets_distinct_ids() {
        let a = make_track_id("loop.wav");
        let b = make_track_id("loop.wav");
        assert_ne!(a, b);
        assert!(a.starts_with("loop.wav-"));
    }

    #[test]
    fn dropped_text_file_is_rejected_without_descriptor() {
        let file = egui::DroppedFile {
            name: "notes.txt".to_owned(),
            bytes: Some(Arc::from(b"hello".as_slice())),
            ..Default::default()
        };
        assert!(FileIntake::load_dropped(&file).is_none());
    }

    #[test]
    fn dropped_audio_bytes_become_a_source() {
        let file = egui::DroppedFile {
            name: "kick.wav".to_owned(),
            bytes: Some(Arc::from(b"RIFF".as_slice())),
            ..Default::default()
        };
        let source = FileIntake::load_dropped(&file).unwrap();
        assert_eq!(source.name, "kick.wav");
        assert_eq!(&source.bytes[..], b"RIFF");
    }

    #[test]
    fn rejection_flag_clears_after_flash_duration() {
        let mut intake = FileIntake::new();
        assert!(!intake.rejection_active());

        intake.mark_rejected();
        let marked = intake.rejected_at.unwrap();

        assert!(intake.rejection_active_at(marked + Duration::from_millis(500)));
        assert!(!intake.rejection_active_at(marked + Duration::from_millis(1001)));
        // 超时读取后标志被清除
        assert!(intake.rejected_at.is_none());
    }
}
