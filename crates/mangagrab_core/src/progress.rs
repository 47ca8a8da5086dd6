/// Number of cells in the rendered progress bar.
pub const PROGRESS_BAR_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }
}

/// Tracks completion of indexed work and only reports the contiguous resolved prefix.
///
/// `current` advances past index `i` once every index `<= i` has been marked, so
/// an early finisher at the end of the list never makes the count jump ahead.
#[derive(Debug, Clone)]
pub struct OrderedProgress {
    resolved: Vec<bool>,
    current: usize,
}

impl OrderedProgress {
    pub fn new(total: usize) -> Self {
        Self {
            resolved: vec![false; total],
            current: 0,
        }
    }

    pub fn snapshot(&self) -> Progress {
        Progress {
            current: self.current,
            total: self.resolved.len(),
        }
    }

    /// Marks `index` as resolved. Returns the new snapshot if `current` advanced.
    ///
    /// Out of range and repeated indices are ignored.
    pub fn mark(&mut self, index: usize) -> Option<Progress> {
        match self.resolved.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return None,
        }

        let before = self.current;
        while self.current < self.resolved.len() && self.resolved[self.current] {
            self.current += 1;
        }
        (self.current > before).then(|| self.snapshot())
    }
}

/// Renders `[####----] page C of T`.
pub fn render_progress_bar(progress: Progress) -> String {
    let marks = if progress.total == 0 {
        PROGRESS_BAR_WIDTH
    } else {
        let ratio = progress.current.min(progress.total) as f64 / progress.total as f64;
        (ratio * PROGRESS_BAR_WIDTH as f64).round() as usize
    };
    let spaces = PROGRESS_BAR_WIDTH - marks;
    format!(
        "[{}{}] page {} of {}",
        "#".repeat(marks),
        "-".repeat(spaces),
        progress.current,
        progress.total
    )
}
