//! # egui_multitrack
//!
//! 一个用于 egui 的多轨波形播放引擎组件库。
//!
//! ## 功能特性
//!
//! - **多轨波形**：每条音轨渲染为独立的波形泳道，支持进度着色与起始偏移
//! - **播放控制**：play/pause/is_playing，基于 rodio 的逐轨 Sink 播放
//! - **缩放与滚动**：全局像素/秒缩放，水平滚动，标尺点击跳转播放位置
//! - **逐轨音量**：按轨道索引设置 0.0–1.0 的增益
//! - **可替换实现**：[`MultitrackEngine`] 抽象允许宿主注入空实现或测试替身
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use egui_multitrack::{
//!     Multitrack, MultitrackEngine, MultitrackOptions, RenderOptions, TrackDescriptor,
//!     TrackSource,
//! };
//!
//! let bytes = std::fs::read("drums.wav")?;
//! let descriptor = TrackDescriptor {
//!     id: "drums.wav-1700000000000-1".to_owned(),
//!     source: TrackSource::new("drums.wav", bytes),
//!     start_position: 0.0,
//!     draggable: true,
//!     options: RenderOptions::default(),
//! };
//!
//! let mut engine = Multitrack::create(&[descriptor], MultitrackOptions::default())?;
//! engine.play();
//!
//! // 在 egui UI 中绘制波形容器：
//! // engine.ui(ui);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! 引擎实例的销毁就是 `Drop`：宿主在重建音轨列表时先丢弃旧实例，再用
//! 完整的描述符列表调用 [`Multitrack::create`]。

pub mod audio;
pub mod engine;
pub mod structure;
pub mod utils;
mod ui;

pub use engine::{Multitrack, MultitrackEngine, MultitrackError, NullMultitrack};
pub use structure::{MultitrackOptions, RenderOptions, TimelineOptions, TrackDescriptor, TrackSource};
