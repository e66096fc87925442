use std::ops::RangeInclusive;

/// Depth of the backend numbering unless configured otherwise
pub const DEFAULT_MAX_DEPTH: i32 = 5;

/// Converts between the backend's fixed-depth level numbering
/// (`max_depth - N + 1 ..= max_depth`) and a version's display numbering (`1 ..= N`).
///
/// Translation is applied right after every fetch and right before every write;
/// levels never travel over the wire in display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTranslator {
    max_depth: i32,
}

impl LevelTranslator {
    pub fn new(max_depth: i32) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> i32 {
        self.max_depth
    }

    /// Constant offset between the two numberings for a version with `levels_count` levels
    pub fn shift(&self, levels_count: i32) -> i32 {
        (self.max_depth - levels_count).max(0)
    }

    pub fn to_display(&self, backend_level: i32, levels_count: i32) -> i32 {
        backend_level - self.shift(levels_count)
    }

    pub fn to_backend(&self, display_level: i32, levels_count: i32) -> i32 {
        display_level + self.shift(levels_count)
    }

    /// Backend levels a version with `levels_count` levels may use
    pub fn backend_range(&self, levels_count: i32) -> RangeInclusive<i32> {
        (self.shift(levels_count) + 1)..=self.max_depth
    }

    pub fn supports(&self, levels_count: i32) -> bool {
        (1..=self.max_depth).contains(&levels_count)
    }
}

impl Default for LevelTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
