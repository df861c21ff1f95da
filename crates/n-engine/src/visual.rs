//! Visual mode: entering and leaving it, growing the selection with text
//! objects and `gn`, and turning the selection into an operator region.
//!
//! The selection is `Mode::Visual { anchor, .. }` plus the session cursor,
//! in either order. Leaving Visual mode records it for `gv` and sets the `<`
//! and `>` marks.

use crate::buffer::TextBuffer;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::insert::Origin;
use crate::mode::{Mode, VisualKind};
use crate::motion::{MotionKind, Span};
use crate::operator::{region, Block, OpArgs, Operator, Region};
use crate::position::{Position, Range};
use crate::session::Session;
use crate::text_object::{self, TextObject};

/// The selection as it was when Visual mode was left, for `gv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LastVisual {
    pub kind: VisualKind,
    pub anchor: Position,
    pub cursor: Position,
    pub to_eol: bool,
}

impl LastVisual {
    /// Inclusive bounds, for `\%V`.
    pub(crate) fn bounds(&self) -> (Position, Position) {
        (self.anchor.min(self.cursor), self.anchor.max(self.cursor))
    }
}

/// The shape of a selection relative to its start, so `.` can rebuild it
/// at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VisualExtent {
    kind: VisualKind,
    lines: usize,
    cols: usize,
    end_col: usize,
}

impl<B: TextBuffer> Session<B> {
    /// `v`, `V`, `<C-v>`: enter, switch kind or leave.
    pub(crate) fn toggle_visual(&mut self, kind: VisualKind) {
        match self.mode {
            Mode::Visual {
                kind: current,
                anchor,
            } if current == kind => self.leave_visual(current, anchor),
            Mode::Visual { anchor, .. } => self.mode = Mode::Visual { kind, anchor },
            _ => {
                self.mode = Mode::Visual {
                    kind,
                    anchor: self.cursor,
                }
            }
        }
    }

    pub(crate) fn leave_visual(&mut self, kind: VisualKind, anchor: Position) {
        let (mut start, mut end) = (anchor.min(self.cursor), anchor.max(self.cursor));
        if kind == VisualKind::Line {
            start.col = 0;
            end.col = self.buffer.line_len(end.line).saturating_sub(1);
        }
        self.marks.remember('<', start);
        self.marks.remember('>', end);
        self.last_visual = Some(LastVisual {
            kind,
            anchor,
            cursor: self.cursor,
            to_eol: self.desired_col == usize::MAX,
        });
        self.mode = Mode::Normal;
    }

    /// The region the selection covers. `lines` widens it to whole lines.
    pub(crate) fn visual_region(&self, kind: VisualKind, anchor: Position, lines: bool) -> Region {
        let (start, end) = (anchor.min(self.cursor), anchor.max(self.cursor));
        match kind {
            _ if lines => Region::Lines {
                first: start.line,
                last: end.line,
            },
            VisualKind::Line => Region::Lines {
                first: start.line,
                last: end.line,
            },
            VisualKind::Char => region(
                &self.buffer,
                Span::new(start, end, MotionKind::Inclusive),
                true,
            ),
            VisualKind::Block => Region::Block(Block {
                first: start.line,
                last: end.line,
                left: anchor.col.min(self.cursor.col),
                right: anchor.col.max(self.cursor.col) + 1,
                to_eol: self.desired_col == usize::MAX,
            }),
        }
    }

    /// An operator over the selection.
    pub(crate) fn operate_visual(&mut self, op: Operator, lines: bool, cmd: &Command) -> Result<()> {
        let Mode::Visual { kind, anchor } = self.mode else {
            return Err(Error::NoTarget);
        };
        let region = self.visual_region(kind, anchor, lines);
        let start = anchor.min(self.cursor);
        self.leave_visual(kind, anchor);
        self.apply(
            op,
            region,
            OpArgs {
                register: cmd.register,
                count: cmd.count1(),
                force_numbered: false,
                visual: true,
                start,
            },
        )
    }

    /// `iw`, `a(`... in Visual mode. Repeating an object that is already
    /// selected takes the next larger one.
    pub(crate) fn select_object(&mut self, object: TextObject, inner: bool, count: usize) -> Result<()> {
        let Mode::Visual { kind, anchor } = self.mode else {
            return Err(Error::NoTarget);
        };
        if let TextObject::Word { big } = object {
            if self.cursor > anchor {
                self.cursor = text_object::extend_word(&self.buffer, self.cursor, inner, big, count)
                    .ok_or(Error::NoTarget)?;
                return Ok(());
            }
        }
        let current = (anchor.min(self.cursor), anchor.max(self.cursor));
        let mut span = self.object_bounds(object, inner, count)?;
        if anchor != self.cursor && span.0 == current.0 && span.1 == current.1 {
            if let Ok(larger) = self.object_bounds(object, inner, count + 1) {
                span = larger;
            }
        }
        let (start, end, linewise) = span;
        if linewise {
            self.mode = Mode::Visual {
                kind: VisualKind::Line,
                anchor: start,
            };
        } else {
            let kind = if kind == VisualKind::Line { VisualKind::Char } else { kind };
            self.mode = Mode::Visual { kind, anchor: start };
        }
        self.cursor = end;
        self.desired_col = end.col;
        Ok(())
    }

    /// Inclusive bounds of an object and whether it is linewise.
    fn object_bounds(&self, object: TextObject, inner: bool, count: usize) -> Result<(Position, Position, bool)> {
        let span = text_object::select(&self.buffer, self.cursor, object, inner, count)
            .ok_or(Error::NoTarget)?;
        match span.kind {
            MotionKind::Linewise => Ok((
                Position::new(span.start.line, 0),
                Position::new(span.end.line, 0),
                true,
            )),
            MotionKind::Inclusive => Ok((span.start, span.end, false)),
            MotionKind::Exclusive => {
                let end = self.buffer.offset_of(span.end);
                if end <= self.buffer.offset_of(span.start) {
                    return Err(Error::NoTarget);
                }
                Ok((span.start, self.buffer.position_of(end - 1), false))
            }
        }
    }

    /// `gn`/`gN` without an operator: select the match, or stretch the
    /// selection to it.
    pub(crate) fn select_match(&mut self, forward: bool) -> Result<()> {
        let m = self.find_match(forward)?;
        let last = self.match_last(m);
        let (from, to) = if forward { (m.start, last) } else { (last, m.start) };
        if !self.mode.is_visual() {
            self.mode = Mode::Visual {
                kind: VisualKind::Char,
                anchor: from,
            };
        }
        self.cursor = to;
        self.desired_col = to.col;
        Ok(())
    }

    /// `gv`
    pub(crate) fn reselect(&mut self) -> Result<()> {
        let last = self.last_visual.ok_or(Error::NoTarget)?;
        if let Mode::Visual { kind, anchor } = self.mode {
            self.leave_visual(kind, anchor);
        }
        self.mode = Mode::Visual {
            kind: last.kind,
            anchor: self.buffer.clamp(last.anchor, true),
        };
        self.cursor = self.buffer.clamp(last.cursor, true);
        self.desired_col = if last.to_eol { usize::MAX } else { self.cursor.col };
        Ok(())
    }

    /// `o` in Visual mode.
    pub(crate) fn swap_ends(&mut self) -> Result<()> {
        let Mode::Visual { kind, anchor } = self.mode else {
            return Err(Error::NoTarget);
        };
        self.mode = Mode::Visual {
            kind,
            anchor: self.cursor,
        };
        self.cursor = anchor;
        self.desired_col = anchor.col;
        Ok(())
    }

    /// `I` and `A` in Visual mode. In block mode the text typed on the first
    /// line is copied to the others on `<Esc>`.
    pub(crate) fn block_insert(&mut self, append: bool, count: usize) -> Result<()> {
        let Mode::Visual { kind, anchor } = self.mode else {
            return Err(Error::NoTarget);
        };
        let (start, end) = (anchor.min(self.cursor), anchor.max(self.cursor));
        let (left, right) = (anchor.col.min(self.cursor.col), anchor.col.max(self.cursor.col) + 1);
        let to_eol = self.desired_col == usize::MAX;
        self.leave_visual(kind, anchor);
        if kind != VisualKind::Block {
            self.cursor = if append {
                end.with_col((end.col + 1).min(self.buffer.line_len(end.line)))
            } else {
                start
            };
            self.begin_insert(Origin::Plain, count);
            return Ok(());
        }
        let len = self.buffer.line_len(start.line);
        let col = match (append, to_eol) {
            (true, true) => len,
            (true, false) => right,
            (false, _) => left,
        };
        if len < col {
            self.edit(
                Range::point(Position::new(start.line, len)),
                &" ".repeat(col - len),
            );
        }
        self.cursor = Position::new(start.line, col);
        self.begin_insert(
            Origin::Block {
                first: start.line,
                last: end.line,
                col,
                to_eol: append && to_eol,
                append,
            },
            1,
        );
        Ok(())
    }

    // ── Dot-repeat ──

    /// The current selection's shape.
    pub(crate) fn visual_extent(&self) -> Option<VisualExtent> {
        let Mode::Visual { kind, anchor } = self.mode else {
            return None;
        };
        let (start, end) = (anchor.min(self.cursor), anchor.max(self.cursor));
        let cols = if kind == VisualKind::Block {
            anchor.col.abs_diff(self.cursor.col)
        } else {
            end.col.saturating_sub(start.col)
        };
        Some(VisualExtent {
            kind,
            lines: end.line - start.line,
            cols,
            end_col: end.col,
        })
    }

    /// Select a region shaped like `extent` starting at the cursor.
    pub(crate) fn restore_extent(&mut self, extent: VisualExtent) {
        let at = self.cursor;
        let line = (at.line + extent.lines).min(self.buffer.line_count() - 1);
        let active = match extent.kind {
            VisualKind::Char if extent.lines == 0 => at.with_col(at.col + extent.cols),
            VisualKind::Char => Position::new(line, extent.end_col),
            VisualKind::Line => Position::new(line, at.col),
            VisualKind::Block => Position::new(line, at.col + extent.cols),
        };
        self.mode = Mode::Visual {
            kind: extent.kind,
            anchor: at,
        };
        self.cursor = self.buffer.clamp(active, true);
    }
}
