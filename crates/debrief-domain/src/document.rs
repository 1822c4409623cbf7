//! Input document model

/// One line of the uploaded post-mortem document.
///
/// `index` is the 1-based position of the line in the original file, so
/// references survive the removal of blank separator lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based position in the original document
    pub index: usize,
    /// Trimmed line text
    pub text: String,
}

/// The uploaded post-mortem notes, immutable once constructed.
///
/// Only non-blank lines are retained; each keeps the 1-based index it had
/// in the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDocument {
    lines: Vec<SourceLine>,
}

impl InputDocument {
    /// Split raw text into ordered non-blank lines.
    ///
    /// Whitespace-only lines are dropped but still count toward the
    /// 1-based numbering of the lines that follow them.
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(SourceLine {
                        index: i + 1,
                        text: trimmed.to_string(),
                    })
                }
            })
            .collect();

        Self { lines }
    }

    /// All retained lines in document order.
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// Number of retained (non-blank) lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the document has no non-blank lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether `index` refers to a retained line of this document.
    pub fn contains_index(&self, index: usize) -> bool {
        self.lines.iter().any(|l| l.index == index)
    }

    /// Text of the line at the given original index, if retained.
    pub fn text_of(&self, index: usize) -> Option<&str> {
        self.lines
            .iter()
            .find(|l| l.index == index)
            .map(|l| l.text.as_str())
    }

    /// Iterator over the original indices of the retained lines.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().map(|l| l.index)
    }
}
