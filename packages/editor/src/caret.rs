//! # Caret Navigator
//!
//! Moves focus from one textblock to a neighbour, optionally keeping the
//! caret's horizontal column.
//!
//! With column preservation the source width up to the caret is measured,
//! then the destination's per-char widths are accumulated until the
//! distance to that width stops shrinking; the caret lands on the closest
//! break index. Without it, the caret snaps to the end of the block when
//! moving backward and to the start when moving forward.
//!
//! Dividers and images are not focusable and are stepped over. Column
//! preservation only applies between immediate neighbours; hopping over a
//! leaf always snaps.

use quire_model::Document;

/// Width measurement context for caret placement.
pub trait TextMeasure {
    fn char_width(&self, c: char) -> f32;

    fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.char_width(c)).sum()
    }
}

/// Every char has the same width. Used by tests and headless hosts.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasure {
    pub width: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self { width: 1.0 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn char_width(&self, _c: char) -> f32 {
        self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// Where the caret should go: a textblock and a char offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretTarget {
    pub block_index: usize,
    pub offset: usize,
}

/// Break index in `text` whose cumulative width is closest to `target`.
///
/// Scans left to right and stops at the first index where the distance
/// grows again; ties go to the later index.
pub fn break_index(text: &str, target: f32, measure: &dyn TextMeasure) -> usize {
    let mut cumulative = 0.0;
    let mut previous_distance = target.abs();
    let mut best = 0;
    let mut best_distance = previous_distance;

    for (i, c) in text.chars().enumerate() {
        cumulative += measure.char_width(c);
        let distance = (cumulative - target).abs();
        if distance <= best_distance {
            best = i + 1;
            best_distance = distance;
        } else if distance > previous_distance {
            break;
        }
        previous_distance = distance;
    }
    best
}

/// Next focusable textblock from `from` in `direction`, if any.
pub fn adjacent_textblock(doc: &Document, from: usize, direction: Direction) -> Option<usize> {
    match direction {
        Direction::Backward => (0..from).rev().find(|&i| doc.blocks[i].is_textblock()),
        Direction::Forward => {
            (from + 1..doc.blocks.len()).find(|&i| doc.blocks[i].is_textblock())
        }
    }
}

/// Caret target when leaving block `from` at `offset` in `direction`.
///
/// Returns `None` at the first or last textblock.
pub fn move_focus(
    doc: &Document,
    from: usize,
    offset: usize,
    direction: Direction,
    preserve_column: bool,
    measure: &dyn TextMeasure,
) -> Option<CaretTarget> {
    let source = doc.blocks.get(from)?;
    let block_index = adjacent_textblock(doc, from, direction)?;
    let destination = &doc.blocks[block_index];
    let len = destination.content_len();

    if len == 0 {
        return Some(CaretTarget {
            block_index,
            offset: 0,
        });
    }

    let neighbour = block_index.abs_diff(from) == 1;
    let offset = if preserve_column && neighbour && source.is_textblock() {
        let before: String = source.text_content().chars().take(offset).collect();
        let target = measure.text_width(&before);
        break_index(&destination.text_content(), target, measure).min(len)
    } else {
        match direction {
            Direction::Backward => len,
            Direction::Forward => 0,
        }
    };

    Some(CaretTarget {
        block_index,
        offset,
    })
}
