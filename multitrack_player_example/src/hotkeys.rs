//! 全局热键模块
//!
//! 把固定的按键集合映射到播放/暂停意图。匹配到的按键会从输入状态
//! 中消费掉，避免同时触发控件的默认行为（滚动、按钮激活等）。

use egui::{Context, Key, Modifiers};

pub struct HotkeyBinder {
    keys: Vec<Key>,
}

impl HotkeyBinder {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    /// 本帧是否有热键被按下。所有匹配的按键都会被消费。
    pub fn triggered(&self, ctx: &Context) -> bool {
        let mut hit = false;
        for &key in &self.keys {
            if ctx.input_mut(|i| i.consume_key(Modifiers::NONE, key)) {
                hit = true;
            }
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Event, RawInput};

    fn press(key: Key) -> Event {
        Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn matching_key_triggers_once() {
        let ctx = Context::default();
        let binder = HotkeyBinder::new(vec![Key::Space, Key::Enter]);

        ctx.begin_pass(RawInput {
            events: vec![press(Key::Space)],
            ..Default::default()
        });

        assert!(binder.triggered(&ctx));
        // 按键已被消费，再次查询不会重复触发
        assert!(!binder.triggered(&ctx));
    }

    #[test]
    fn unrelated_key_does_not_trigger() {
        let ctx = Context::default();
        let binder = HotkeyBinder::new(vec![Key::Space, Key::Enter]);

        ctx.begin_pass(RawInput {
            events: vec![press(Key::A)],
            ..Default::default()
        });

        assert!(!binder.triggered(&ctx));
    }
}
