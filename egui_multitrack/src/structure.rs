//! 数据结构模块
//!
//! 定义多轨引擎使用的核心数据结构：音轨来源、音轨描述符和引擎创建选项。

use egui::Color32;
use std::fmt;
use std::sync::Arc;

/// 音轨的音频来源。
///
/// 文件字节在导入时一次性读入共享缓冲区；引擎销毁且描述符全部丢弃后，
/// 缓冲区随最后一个 `Arc` 克隆自动释放。
#[derive(Clone)]
pub struct TrackSource {
    /// 显示名称（通常是文件名）。
    pub name: String,
    /// 完整的文件内容。
    pub bytes: Arc<[u8]>,
}

impl TrackSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 字节内容太大，只打印长度
        f.debug_struct("TrackSource")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// 音轨的创建时描述符，创建后不再修改。
#[derive(Clone, Debug)]
pub struct TrackDescriptor {
    /// 全局唯一 id，由文件名和创建时间派生。
    pub id: String,
    pub source: TrackSource,
    /// 在时间轴上的起始位置（秒，≥ 0）。
    pub start_position: f64,
    /// 暂停状态下是否允许水平拖动调整起始位置。
    pub draggable: bool,
    pub options: RenderOptions,
}

/// 单条音轨泳道的渲染选项。
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub wave_color: Color32,
    /// 播放光标左侧已播放部分的颜色。
    pub progress_color: Color32,
    /// 泳道高度（像素）。
    pub height: f32,
    /// 是否把波形峰值归一化到满幅。
    pub normalize: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wave_color: Color32::from_rgb(16, 234, 165),
            progress_color: Color32::from_rgb(7, 95, 67),
            height: 100.0,
            normalize: true,
        }
    }
}

/// 时间轴标尺选项。
#[derive(Clone, Debug)]
pub struct TimelineOptions {
    pub height: f32,
    pub text_color: Color32,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            height: 20.0,
            text_color: Color32::WHITE,
        }
    }
}

/// 引擎实例的创建选项。
#[derive(Clone, Debug)]
pub struct MultitrackOptions {
    pub cursor_width: f32,
    pub cursor_color: Color32,
    pub track_background: Color32,
    pub track_border_color: Color32,
    /// 为真时拖动音轨不允许起始位置为负。
    pub drag_bounds: bool,
    pub timeline: TimelineOptions,
    /// 初始缩放（像素/秒）。
    pub min_px_per_sec: f32,
}

impl Default for MultitrackOptions {
    fn default() -> Self {
        Self {
            cursor_width: 2.0,
            cursor_color: Color32::from_rgb(0xD7, 0x2F, 0x21),
            track_background: Color32::from_rgb(0x2D, 0x2D, 0x2D),
            track_border_color: Color32::from_rgb(0x7C, 0x7C, 0x7C),
            drag_bounds: true,
            timeline: TimelineOptions::default(),
            min_px_per_sec: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_zoom_is_ten_px_per_sec() {
        assert_eq!(MultitrackOptions::default().min_px_per_sec, 10.0);
    }

    #[test]
    fn default_render_options() {
        let options = RenderOptions::default();
        assert_eq!(options.height, 100.0);
        assert!(options.normalize);
        assert_ne!(options.wave_color, options.progress_color);
    }

    #[test]
    fn track_source_shares_bytes() {
        let source = TrackSource::new("a.wav", vec![1u8, 2, 3]);
        let clone = source.clone();
        assert!(Arc::ptr_eq(&source.bytes, &clone.bytes));
        assert_eq!(format!("{:?}", source), format!("{:?}", clone));
    }
}
