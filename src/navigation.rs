use crate::question::OptionKey;
use crate::tracker::QuestionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Single,
    All,
}

/// Current slot, pre-submission highlight and display mode. Pure UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
    len: usize,
    highlighted: Option<OptionKey>,
    mode: ViewMode,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self {
            current: 0,
            len,
            highlighted: None,
            mode: ViewMode::Single,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.len
    }

    pub fn highlighted(&self) -> Option<OptionKey> {
        self.highlighted
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Highlights an option on the current slot without scoring it.
    pub fn select(&mut self, option: OptionKey) {
        self.highlighted = Some(option);
    }

    pub fn next(&mut self, statuses: &[QuestionStatus]) -> bool {
        if self.is_last() {
            return false;
        }
        self.land(self.current + 1, statuses);
        true
    }

    pub fn previous(&mut self, statuses: &[QuestionStatus]) -> bool {
        if self.is_first() {
            return false;
        }
        self.land(self.current - 1, statuses);
        true
    }

    /// Jumps to `index`; out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize, statuses: &[QuestionStatus]) -> bool {
        if index >= self.len {
            return false;
        }
        self.land(index, statuses);
        true
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        self.mode = match self.mode {
            ViewMode::Single => ViewMode::All,
            ViewMode::All => ViewMode::Single,
        };
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Re-reads the highlight from the slot's committed status.
    pub fn sync(&mut self, statuses: &[QuestionStatus]) {
        self.highlighted = statuses.get(self.current).and_then(QuestionStatus::selected);
    }

    fn land(&mut self, index: usize, statuses: &[QuestionStatus]) {
        self.current = index;
        self.sync(statuses);
    }
}
