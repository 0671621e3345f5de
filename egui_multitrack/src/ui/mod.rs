//! UI 模块
//!
//! 负责时间轴标尺、波形泳道和播放光标的绘制与交互。
//! 点击标尺跳转播放位置；暂停时可以水平拖动音轨调整起始位置。

use crate::engine::Multitrack;
use crate::utils::{format_time, major_interval};
use egui::*;

/// 泳道之间的垂直间距。
const LANE_SPACING: f32 = 2.0;

impl Multitrack {
    pub(crate) fn draw(&mut self, ui: &mut Ui) {
        self.advance_clock(ui);

        ScrollArea::horizontal()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let total = self.total_duration();
                let content_width =
                    ((total * self.zoom as f64) as f32 + 40.0).max(ui.available_width());
                let ruler_height = self.options.timeline.height;
                let lanes_height: f32 = self
                    .tracks
                    .iter()
                    .map(|t| t.descriptor.options.height + LANE_SPACING)
                    .sum();

                let size = Vec2::new(content_width, ruler_height + lanes_height);
                let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
                let painter = ui.painter().with_clip_rect(rect.intersect(ui.clip_rect()));

                let ruler_rect = Rect::from_min_size(rect.min, Vec2::new(rect.width(), ruler_height));
                self.draw_ruler(&painter, ruler_rect);

                let cursor_x = rect.min.x + (self.playhead * self.zoom as f64) as f32;
                let mut y = ruler_rect.max.y + LANE_SPACING;
                for index in 0..self.tracks.len() {
                    let height = self.tracks[index].descriptor.options.height;
                    let lane_rect =
                        Rect::from_min_size(Pos2::new(rect.min.x, y), Vec2::new(rect.width(), height));
                    self.draw_lane(&painter, index, lane_rect, cursor_x);
                    y += height + LANE_SPACING;
                }

                // 播放光标贯穿标尺和所有泳道
                painter.line_segment(
                    [Pos2::new(cursor_x, rect.min.y), Pos2::new(cursor_x, rect.max.y)],
                    Stroke::new(self.options.cursor_width, self.options.cursor_color),
                );

                self.handle_interactions(&response, rect, ruler_rect);
            });
    }

    /// 播放时按帧间隔推进光标（参考宿主事件循环的时间源）。
    fn advance_clock(&mut self, ui: &Ui) {
        if self.playing {
            ui.ctx().request_repaint();
            let now = ui.input(|i| i.time);
            let dt = now - self.last_update;
            self.last_update = now;

            // 跳过异常帧间隔（例如窗口失焦后恢复）
            if dt > 0.0 && dt < 1.0 {
                self.playhead += dt;
            }

            let total = self.total_duration();
            if self.playhead >= total {
                // 播放到结尾自动停止
                self.playhead = total;
                self.playing = false;
                self.stop_sinks();
            }
        } else {
            self.last_update = ui.input(|i| i.time);
        }
    }

    fn draw_ruler(&self, painter: &Painter, rect: Rect) {
        painter.rect_filled(rect, 0.0, Color32::from_gray(40));

        let seconds_per_pixel = 1.0 / self.zoom.max(1.0) as f64;
        let major = major_interval(seconds_per_pixel);
        let minor = major / 4.0;

        // 只绘制可见范围内的刻度
        let clip = painter.clip_rect();
        let start_time =
            (((clip.min.x - rect.min.x).max(0.0) as f64 * seconds_per_pixel) / minor).floor() * minor;
        let end_time = (clip.max.x - rect.min.x).max(0.0) as f64 * seconds_per_pixel;

        let mut time = start_time;
        while time <= end_time {
            let x = rect.min.x + (time * self.zoom as f64) as f32;
            painter.line_segment(
                [Pos2::new(x, rect.max.y - 6.0), Pos2::new(x, rect.max.y)],
                Stroke::new(1.0, Color32::from_gray(90)),
            );
            time += minor;
        }

        let mut time = (start_time / major).floor() * major;
        while time <= end_time {
            if time >= 0.0 {
                let x = rect.min.x + (time * self.zoom as f64) as f32;
                painter.line_segment(
                    [Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)],
                    Stroke::new(1.0, Color32::from_gray(130)),
                );
                painter.text(
                    Pos2::new(x + 3.0, rect.min.y + 1.0),
                    Align2::LEFT_TOP,
                    format_time(time, major < 1.0),
                    FontId::proportional(10.0),
                    self.options.timeline.text_color,
                );
            }
            time += major;
        }
    }

    fn draw_lane(&self, painter: &Painter, index: usize, rect: Rect, cursor_x: f32) {
        let track = &self.tracks[index];
        let render = &track.descriptor.options;

        painter.rect_filled(rect, 0.0, self.options.track_background);
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, self.options.track_border_color));

        if track.peaks.is_empty() {
            // 解码失败或空音轨的占位槽
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                &track.descriptor.source.name,
                FontId::proportional(10.0),
                Color32::from_gray(150),
            );
            return;
        }

        let clip = painter.clip_rect().intersect(rect);
        if !clip.is_positive() {
            return;
        }

        let start_x = rect.min.x + (track.descriptor.start_position * self.zoom as f64) as f32;
        let px_per_bucket = (track.seconds_per_bucket * self.zoom as f64) as f32;
        if px_per_bucket <= 0.0 {
            return;
        }
        let wave_width = track.peaks.len() as f32 * px_per_bucket;
        let center_y = rect.center().y;
        let half = rect.height() * 0.5 - 2.0;

        // 按像素列聚合峰值桶，每列画一条竖线
        let first_col = (clip.min.x - start_x).floor().max(0.0) as usize;
        let last_col = (clip.max.x - start_x).ceil().min(wave_width).max(0.0) as usize;
        let last_bucket = track.peaks.len() - 1;
        for col in first_col..last_col {
            let x = start_x + col as f32;
            let b0 = ((col as f32 / px_per_bucket) as usize).min(last_bucket);
            let b1 = (((col + 1) as f32 / px_per_bucket) as usize).clamp(b0, last_bucket);
            let mut lo = f32::MAX;
            let mut hi = f32::MIN;
            for &(peak_lo, peak_hi) in &track.peaks[b0..=b1] {
                lo = lo.min(peak_lo);
                hi = hi.max(peak_hi);
            }
            let color = if x < cursor_x {
                render.progress_color
            } else {
                render.wave_color
            };
            painter.line_segment(
                [
                    Pos2::new(x, center_y - hi.clamp(-1.0, 1.0) * half),
                    Pos2::new(x, center_y - lo.clamp(-1.0, 1.0) * half),
                ],
                Stroke::new(1.0, color),
            );
        }

        painter.text(
            Pos2::new(rect.min.x + 4.0, rect.min.y + 2.0),
            Align2::LEFT_TOP,
            &track.descriptor.source.name,
            FontId::proportional(10.0),
            Color32::from_gray(200),
        );
    }

    fn handle_interactions(&mut self, response: &Response, rect: Rect, ruler_rect: Rect) {
        // 点击标尺跳转播放位置
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if ruler_rect.contains(pos) {
                    let time = ((pos.x - rect.min.x) / self.zoom).max(0.0) as f64;
                    self.seek(time);
                }
            }
        }

        // 暂停时水平拖动泳道调整起始位置
        if response.dragged() && !self.is_dragging_blocked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(index) = self.lane_at(pos.y, rect) {
                    let delta = response.drag_delta().x / self.zoom.max(1.0);
                    self.shift_track(index, delta as f64);
                }
            }
        }
    }

    fn is_dragging_blocked(&self) -> bool {
        self.playing
    }

    fn lane_at(&self, y: f32, rect: Rect) -> Option<usize> {
        let mut top = rect.min.y + self.options.timeline.height + LANE_SPACING;
        for (index, track) in self.tracks.iter().enumerate() {
            let bottom = top + track.descriptor.options.height;
            if y >= top && y < bottom {
                return Some(index);
            }
            top = bottom + LANE_SPACING;
        }
        None
    }
}
