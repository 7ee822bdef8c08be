//! Bounded access to an evaluation's logical lines.

/// The logical lines of one evaluation, with range-checked relative lookups.
#[derive(Debug, Clone)]
pub struct LineWindow<'a> {
    lines: Vec<&'a str>,
}

impl<'a> LineWindow<'a> {
    /// Split raw evaluation text into logical lines.
    ///
    /// Lines are split on `\n`; a trailing `\r` is dropped from each.
    pub fn new(text: &'a str) -> Self {
        let lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    /// The line `back` positions before `index`, if it exists.
    pub fn before(&self, index: usize, back: usize) -> Option<&'a str> {
        index.checked_sub(back).and_then(|i| self.get(i))
    }

    /// The line `ahead` positions after `index`, if it exists.
    pub fn after(&self, index: usize, ahead: usize) -> Option<&'a str> {
        index.checked_add(ahead).and_then(|i| self.get(i))
    }

    /// Exactly `count` lines following `index`, or `None` if fewer remain.
    pub fn following(&self, index: usize, count: usize) -> Option<&[&'a str]> {
        let start = index.checked_add(1)?;
        let end = start.checked_add(count)?;
        self.lines.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_strips_carriage_returns() {
        let w = LineWindow::new("a\r\nb\nc");
        assert_eq!(w.lines(), &["a", "b", "c"]);
    }

    #[test]
    fn lookups_never_wrap() {
        let w = LineWindow::new("0\n1\n2\n3");
        assert_eq!(w.before(2, 2), Some("0"));
        assert_eq!(w.before(2, 5), None);
        assert_eq!(w.after(1, 2), Some("3"));
        assert_eq!(w.after(1, 3), None);
        assert_eq!(w.following(0, 3), Some(&["1", "2", "3"][..]));
        assert_eq!(w.following(1, 3), None);
    }
}
