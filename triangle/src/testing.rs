use crate::input::Key;
use crate::window::{WindowError, WindowSystem};

/// Scripted window: frame `n` sees the keys of `frames[n]`. The window
/// reports a close request once the script runs out.
pub struct FakeWindow {
    frames: Vec<Vec<Key>>,
    resizes: Vec<Option<(u32, u32)>>,
    current: usize,
    should_close: bool,
    pub swaps: usize,
    pub polls: usize,
    pub swap_intervals: Vec<u32>,
}

impl FakeWindow {
    pub fn new(frames: Vec<Vec<Key>>) -> Self {
        let resizes = vec![None; frames.len()];

        Self {
            should_close: frames.is_empty(),
            frames,
            resizes,
            current: 0,
            swaps: 0,
            polls: 0,
            swap_intervals: Vec::new(),
        }
    }

    /// Reports a resize when polling after frame `frame`.
    pub fn with_resize(mut self, frame: usize, width: u32, height: u32) -> Self {
        self.resizes[frame] = Some((width, height));
        self
    }
}

impl WindowSystem for FakeWindow {
    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    fn is_pressed(&self, key: Key) -> bool {
        self.frames
            .get(self.current)
            .map_or(false, |keys| keys.contains(&key))
    }

    fn swap_buffers(&mut self) -> Result<(), WindowError> {
        self.swaps += 1;
        Ok(())
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.swap_intervals.push(interval);
    }

    fn poll_events(&mut self) -> Option<(u32, u32)> {
        let resized = self.resizes.get(self.current).copied().flatten();

        self.polls += 1;
        self.current += 1;
        if self.current >= self.frames.len() {
            self.should_close = true;
        }

        resized
    }
}
