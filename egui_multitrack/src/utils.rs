//! 工具函数模块
//!
//! 时间格式化和标尺刻度间隔计算。

/// 将时间（秒）格式化为标尺标签。
///
/// `with_millis` 为真时使用 "MM:SS.mmm"，否则使用 "MM:SS"。
///
/// # 示例
///
/// ```
/// use egui_multitrack::utils::format_time;
///
/// assert_eq!(format_time(125.5, true), "02:05.500");
/// assert_eq!(format_time(125.5, false), "02:05");
/// ```
pub fn format_time(time_seconds: f64, with_millis: bool) -> String {
    let minutes = (time_seconds / 60.0) as u32;
    let seconds = (time_seconds % 60.0) as u32;
    if with_millis {
        let milliseconds = ((time_seconds % 1.0) * 1000.0).round() as u32;
        format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// 根据每像素秒数选择合适的主刻度间隔。
///
/// 目标是主刻度之间保持约 100 像素，间隔取 0.1/0.25/0.5/1/2/5
/// 乘以 10 的幂。
pub(crate) fn major_interval(seconds_per_pixel: f64) -> f64 {
    let target_pixels_between_markers = 100.0;
    let target_interval = seconds_per_pixel * target_pixels_between_markers;

    let magnitude = 10.0_f64.powf(target_interval.log10().floor());
    let normalized = target_interval / magnitude;

    let nice_value = if normalized <= 0.15 {
        0.1
    } else if normalized <= 0.35 {
        0.25
    } else if normalized <= 0.75 {
        0.5
    } else if normalized <= 1.5 {
        1.0
    } else if normalized <= 3.5 {
        2.0
    } else {
        5.0
    };

    nice_value * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_without_millis() {
        assert_eq!(format_time(0.0, false), "00:00");
        assert_eq!(format_time(61.2, false), "01:01");
    }

    #[test]
    fn major_interval_is_nice_valued() {
        // 默认缩放 10 px/s：每像素 0.1 秒，主刻度 10 秒
        assert_eq!(major_interval(0.1), 10.0);
        // 最大缩放 100 px/s：主刻度 1 秒
        assert_eq!(major_interval(0.01), 1.0);
    }
}
