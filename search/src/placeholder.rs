/// Cycles through the input hints shown while the query is empty.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRotation {
    hints: Vec<String>,
    index: usize,
}

impl PlaceholderRotation {
    pub fn new(hints: Vec<String>) -> Self {
        Self { hints, index: 0 }
    }

    pub fn current(&self) -> Option<&str> {
        self.hints.get(self.index).map(String::as_str)
    }

    pub fn advance(&mut self) -> Option<&str> {
        if self.hints.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.hints.len();
        self.current()
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Nothing to rotate through.
    pub fn is_static(&self) -> bool {
        self.hints.len() < 2
    }
}
