//! Code cells: a bordered, shaded single-cell table holding an `In [n]:`
//! label and one tinted paragraph per source line.
//!
//! Tinting is an ordered set of line rules, not a tokenizer:
//!
//! 1. trimmed line starts with `#` → whole line in the comment colour
//! 2. line contains `print(` → text before, `print` in the call colour, rest
//! 3. line contains `import ` → `import` keyword first, then the line with
//!    its first `import` removed (the keyword is moved to the front)
//! 4. otherwise → one default-colour run
//!
//! Every line yields exactly one paragraph.

use crate::document::{Block, Borders, Paragraph, Table, TableCell, TextRun};
use crate::style;

/// Per-conversion `In [n]:` counter.
///
/// Starts at 1 and advances once per code cell whose source is not blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionCounter(u32);

impl ExecutionCounter {
    pub fn new() -> Self {
        Self(1)
    }

    /// The value the next rendered code cell will be labelled with.
    pub fn current(&self) -> u32 {
        self.0
    }

    /// Return the current value and advance.
    fn advance(&mut self) -> u32 {
        let n = self.0;
        self.0 += 1;
        n
    }
}

impl Default for ExecutionCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a code cell's normalized source.
///
/// Returns `None` (and leaves the counter untouched) when the source is blank.
pub fn render_code(source: &str, counter: &mut ExecutionCounter) -> Option<Block> {
    if source.trim().is_empty() {
        return None;
    }
    let n = counter.advance();

    let mut paragraphs = Vec::with_capacity(source.matches('\n').count() + 2);
    paragraphs.push(
        Paragraph::new()
            .with_run(TextRun::code(format!("In [{n}]: "), style::COLOR_MUTED))
            .spacing(100, 50),
    );
    paragraphs.extend(source.split('\n').map(|line| {
        tint_line(line)
            .into_iter()
            .fold(Paragraph::new(), Paragraph::with_run)
    }));

    Some(Block::Table(Table {
        rows: vec![vec![TableCell {
            paragraphs,
            shading: Some(style::COLOR_CODE_SHADING),
            width_pct: Some(100.0),
        }]],
        borders: Borders::Single {
            size: 1,
            color: style::COLOR_CODE_BORDER,
        },
    }))
}

/// Split one source line into coloured runs.
pub fn tint_line(line: &str) -> Vec<TextRun> {
    if line.trim().starts_with('#') {
        return vec![TextRun::code(line, style::COLOR_COMMENT)];
    }

    if let Some(idx) = line.find("print(") {
        let mut runs = Vec::with_capacity(3);
        let before = &line[..idx];
        if !before.is_empty() {
            runs.push(TextRun::code(before, style::COLOR_DEFAULT));
        }
        runs.push(TextRun::code("print", style::COLOR_CALL));
        runs.push(TextRun::code(&line[idx + "print".len()..], style::COLOR_DEFAULT));
        return runs;
    }

    if line.contains("import ") {
        return vec![
            TextRun::code("import", style::COLOR_KEYWORD),
            TextRun::code(line.replacen("import", "", 1), style::COLOR_DEFAULT),
        ];
    }

    vec![TextRun::code(line, style::COLOR_DEFAULT)]
}
