//! The interpreter session: one buffer plus everything commands share.
//!
//! A host owns the text and hands keys to [`Session::handle_key`]. The
//! session parses them into commands, runs them against the buffer through
//! the [`TextBuffer`] contract, and answers with a [`KeyOutcome`]: the mode,
//! the selections to draw, and any status message.
//!
//! ```text
//! key ─┬─ Insert/Replace ──────────────▶ insert session
//!      ├─ pattern prompt open ─────────▶ prompt editing ─▶ search command
//!      └─ Normal/Visual ─▶ Parser ─▶ Command ─▶ run ─▶ buffer edits
//!                                                 └──▶ undo step, `.`, change list
//! ```
//!
//! Every command runs inside one undo transaction. A command that enters
//! Insert mode keeps its transaction open until `<Esc>`, so `cw` plus the
//! typed text undo together and repeat together with `.`.

use n_keys::{KeyEvent, parse_keys};
use tracing::{debug, trace};

use crate::buffer::{Buffer, TextBuffer};
use crate::command::{Action, Command, ParseContext, Parsed, Parser, PromptStart};
use crate::error::{Error, Result};
use crate::history::{History, end_after};
use crate::insert::InsertSession;
use crate::jumplist::{ChangeList, JumpList};
use crate::mark::{MarkTarget, Marks};
use crate::mode::Mode;
use crate::motion::{
    Column, FindKind, Motion, MotionContext, MotionKind, Purpose, Target, find_char,
    first_non_blank, resolve,
};
use crate::options::Options;
use crate::position::{Position, Range, Selection};
use crate::register::RegisterFile;
use crate::search::{
    LastSearch, Match, Prompt, PromptEvent, SearchDirection, SearchOffset, SearchState, compile,
    find, find_all, split_offset, star_pattern, word_under_cursor,
};
use crate::visual::{LastVisual, VisualExtent};

/// Something the host has to do on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// A global mark points into another buffer.
    JumpToMark { buffer: String, pos: Position },
}

/// The state after one key (or a run of keys).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    pub mode: Mode,
    pub selections: Vec<Selection>,
    /// A message for the status line, if the key produced one.
    pub status: Option<String>,
    pub request: Option<HostRequest>,
}

/// The last repeatable command, for `.`.
#[derive(Debug, Clone)]
pub(crate) struct DotRepeat {
    command: Command,
    /// Keys typed in the Insert session the command opened, `<Esc>` included.
    pub(crate) inserted: Vec<KeyEvent>,
    /// The selection shape for commands run from Visual mode.
    extent: Option<VisualExtent>,
}

pub struct Session<B: TextBuffer = Buffer> {
    pub(crate) buffer: B,
    pub(crate) name: String,
    pub(crate) options: Options,
    pub(crate) mode: Mode,
    pub(crate) cursor: Position,
    /// Sticky column for vertical motions; `usize::MAX` after `$`.
    pub(crate) desired_col: usize,
    parser: Parser,

    pub(crate) registers: RegisterFile,
    pub(crate) marks: Marks,
    history: History,
    jumps: JumpList,
    changes: ChangeList,
    pub(crate) search: SearchState,
    prompt: Option<(Prompt, PromptStart)>,
    last_find: Option<(FindKind, char)>,

    pub(crate) dot: Option<DotRepeat>,
    /// Insert keys are being appended to `dot`.
    pub(crate) recording: bool,
    /// `.` is replaying; nothing is recorded.
    pub(crate) replaying: bool,

    pub(crate) insert: Option<InsertSession>,
    /// Where the last insert stopped, for `gi`.
    pub(crate) insert_point: Option<Position>,
    pub(crate) last_visual: Option<LastVisual>,

    status: Option<String>,
    key_status: Option<String>,
    request: Option<HostRequest>,
    modified: bool,
    /// First and last position touched by the running command.
    changed: Option<(Position, Position)>,
}

impl Session<Buffer> {
    /// A session over `text` in a rope buffer.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(Buffer::from_text(text))
    }
}

impl<B: TextBuffer> Session<B> {
    #[must_use]
    pub fn new(buffer: B) -> Self {
        Self::with_options(buffer, Options::default())
    }

    #[must_use]
    pub fn with_options(buffer: B, options: Options) -> Self {
        Self {
            buffer,
            name: "[No Name]".to_string(),
            options,
            mode: Mode::Normal,
            cursor: Position::default(),
            desired_col: 0,
            parser: Parser::new(),
            registers: RegisterFile::new(),
            marks: Marks::new(),
            history: History::new(),
            jumps: JumpList::new(),
            changes: ChangeList::new(),
            search: SearchState::default(),
            prompt: None,
            last_find: None,
            dot: None,
            recording: false,
            replaying: false,
            insert: None,
            insert_point: None,
            last_visual: None,
            status: None,
            key_status: None,
            request: None,
            modified: false,
            changed: None,
        }
    }

    /// Name the buffer, for `<C-g>` and global marks.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // ── Accessors ──

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn into_buffer(self) -> B {
        self.buffer
    }

    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor from outside, e.g. after a host-side jump.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
        self.normalize_cursor();
        self.desired_col = self.cursor.col;
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub const fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// The last status message.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Look up a mark as `'x` would.
    pub fn mark(&self, name: char) -> Result<MarkTarget> {
        if name == '.' {
            return self
                .changes
                .last()
                .map(MarkTarget::Here)
                .ok_or(Error::MarkNotSet('.'));
        }
        self.marks.get(name, &self.name)
    }

    /// The open pattern prompt as typed, `/` or `?` included.
    pub fn prompt(&self) -> Option<String> {
        self.prompt
            .as_ref()
            .map(|(p, _)| format!("{}{}", p.direction().prefix(), p.input()))
    }

    /// True while a command is half typed.
    pub fn is_pending(&self) -> bool {
        self.parser.is_pending() || self.prompt.is_some()
    }

    /// The selections to draw: the Visual selection, else the cursor.
    pub fn selections(&self) -> Vec<Selection> {
        match self.mode {
            Mode::Visual { kind, anchor } => vec![Selection {
                anchor,
                active: self.cursor,
                kind: kind.range_kind(),
            }],
            _ => vec![Selection::cursor(self.cursor)],
        }
    }

    // ── Keys ──

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        trace!(target: "engine.session", ?key, mode = self.mode.display_name(), "key");
        self.dispatch(key);
        self.normalize_cursor();
        KeyOutcome {
            mode: self.mode,
            selections: self.selections(),
            status: self.key_status.take(),
            request: self.request.take(),
        }
    }

    /// Feed keys written in Vim notation (`d3w`, `cwfoo<Esc>`). The outcome
    /// carries the last status and request any of them produced.
    pub fn feed(&mut self, keys: &str) -> KeyOutcome {
        let mut status = None;
        let mut request = None;
        for key in parse_keys(keys) {
            let outcome = self.handle_key(key);
            status = outcome.status.or(status);
            request = outcome.request.or(request);
        }
        KeyOutcome {
            mode: self.mode,
            selections: self.selections(),
            status,
            request,
        }
    }

    fn dispatch(&mut self, key: KeyEvent) {
        if self.mode.is_input() {
            self.insert_key(key);
            return;
        }
        if self.prompt.is_some() {
            self.prompt_key(key);
            return;
        }
        if key.is_escape() && !self.parser.is_pending() {
            if let Mode::Visual { kind, anchor } = self.mode {
                self.leave_visual(kind, anchor);
            }
            return;
        }
        let ctx = match self.mode {
            Mode::Visual { kind, .. } => ParseContext::Visual(kind),
            _ => ParseContext::Normal,
        };
        match self.parser.feed(key, ctx) {
            Parsed::Complete(cmd) => self.run(cmd),
            Parsed::Prompt(start) => {
                let direction = SearchDirection::from_forward(start.forward);
                self.prompt = Some((Prompt::new(direction, self.cursor), start));
            }
            Parsed::Incomplete | Parsed::Invalid => {}
        }
    }

    fn prompt_key(&mut self, key: KeyEvent) {
        let Some((mut prompt, start)) = self.prompt.take() else {
            return;
        };
        match prompt.handle(key, self.search.history()) {
            PromptEvent::Editing => self.prompt = Some((prompt, start)),
            PromptEvent::ExtendFromMatch => {
                self.extend_prompt(&mut prompt);
                self.prompt = Some((prompt, start));
            }
            PromptEvent::Cancel => {}
            PromptEvent::Submit(text) => {
                self.search.remember(&text);
                self.run(start.finish(text));
            }
        }
    }

    /// `<C-l>` in the prompt: add the char after the current match.
    fn extend_prompt(&self, prompt: &mut Prompt) {
        let delimiter = prompt.direction().prefix();
        let (text, _) = split_offset(prompt.input(), delimiter);
        if text.is_empty() {
            return;
        }
        let Ok(pattern) = compile(text, delimiter, &self.options) else {
            return;
        };
        let visual = self.last_visual.map(|v| v.bounds());
        let found = find(
            &self.buffer,
            &pattern,
            prompt.saved_pos(),
            prompt.direction(),
            self.options.wrapscan,
            visual,
        );
        let next = found.and_then(|m| self.buffer.char_at(self.buffer.offset_of(m.end)));
        if let Some(c) = next.filter(|c| *c != '\n') {
            prompt.push(c);
        }
    }

    // ── Commands ──

    /// Run one parsed command as one undo step.
    pub(crate) fn run(&mut self, cmd: Command) {
        trace!(target: "engine.session", ?cmd, "run");
        let opened = self.history.begin(self.cursor);
        let extent = self.visual_extent();
        match self.execute(&cmd) {
            Ok(()) => {
                if cmd.is_repeatable() && !self.replaying {
                    self.recording = self.mode.is_input();
                    self.dot = Some(DotRepeat {
                        command: cmd,
                        inserted: Vec::new(),
                        extent,
                    });
                }
            }
            Err(err) => self.report(&err),
        }
        if opened && !self.mode.is_input() {
            self.normalize_cursor();
            self.finish_change();
        }
    }

    fn execute(&mut self, cmd: &Command) -> Result<()> {
        let n = cmd.count1();
        match &cmd.action {
            Action::Move(motion) => self.move_by(motion, cmd.count),
            Action::Operate { op, target } => self.operate(*op, target, cmd),
            Action::Select { op, lines } => self.operate_visual(*op, *lines, cmd),
            Action::SelectObject { object, inner } => self.select_object(*object, *inner, n),
            Action::SelectMatch { forward } => self.select_match(*forward),
            Action::Insert(kind) => {
                self.start_insert(*kind, n);
                Ok(())
            }
            Action::BlockInsert { append } => self.block_insert(*append, n),
            Action::ReplaceMode => {
                self.start_replace(n);
                Ok(())
            }
            Action::Visual(kind) => {
                self.toggle_visual(*kind);
                Ok(())
            }
            Action::Reselect => self.reselect(),
            Action::SwapEnds => self.swap_ends(),
            Action::Put {
                before,
                cursor_after,
            } => self.put(cmd.register, n, *before, *cursor_after),
            Action::Undo => {
                self.undo(n);
                Ok(())
            }
            Action::Redo => {
                self.redo(n);
                Ok(())
            }
            Action::Join { spaces } => self.join(cmd.count, *spaces),
            Action::ReplaceChar(ch) => self.replace_char(*ch, n),
            Action::ToggleCase => self.toggle_chars(n),
            Action::Increment {
                negative,
                progressive,
            } => self.increment(n, *negative, *progressive),
            Action::Repeat => self.repeat(cmd.count),
            Action::SetMark(name) => self.marks.set(*name, self.cursor, &self.name),
            Action::ChangeOlder => {
                let pos = self.changes.back(n)?;
                self.jump_to(pos);
                Ok(())
            }
            Action::ChangeNewer => {
                let pos = self.changes.forward(n)?;
                self.jump_to(pos);
                Ok(())
            }
            Action::JumpOlder => {
                let pos = self.jumps.back(self.cursor, n).ok_or(Error::NoTarget)?;
                self.jump_to(pos);
                Ok(())
            }
            Action::JumpNewer => {
                let pos = self.jumps.forward(n).ok_or(Error::NoTarget)?;
                self.jump_to(pos);
                Ok(())
            }
            Action::FileInfo => {
                let info = self.file_info();
                self.set_status(info);
                Ok(())
            }
        }
    }

    fn report(&mut self, err: &Error) {
        debug!(target: "engine.session", %err, "command failed");
        if err.is_reported() {
            self.set_status(err.to_string());
        }
    }

    pub(crate) fn set_status(&mut self, msg: String) {
        self.key_status = Some(msg.clone());
        self.status = Some(msg);
    }

    fn normalize_cursor(&mut self) {
        let past_end = self.mode.cursor_past_end() || self.mode.is_visual();
        self.cursor = self.buffer.clamp(self.cursor, past_end);
    }

    fn jump_to(&mut self, pos: Position) {
        self.cursor = self.buffer.clamp(pos, false);
        self.desired_col = self.cursor.col;
    }

    /// Close the running command's undo step and record where it changed
    /// the text.
    pub(crate) fn finish_change(&mut self) {
        if let Some((start, end)) = self.changed.take() {
            self.marks.remember('[', start);
            self.marks.remember(']', end);
            self.changes.push(self.cursor);
        }
        self.history.commit(self.cursor);
    }

    fn undo(&mut self, n: usize) {
        for _ in 0..n {
            let Some(pos) = self.history.undo(&mut self.buffer) else {
                self.set_status("Already at oldest change".to_string());
                break;
            };
            self.cursor = pos;
            self.modified = true;
        }
        self.desired_col = self.cursor.col;
    }

    fn redo(&mut self, n: usize) {
        for _ in 0..n {
            let Some(pos) = self.history.redo(&mut self.buffer) else {
                self.set_status("Already at newest change".to_string());
                break;
            };
            self.cursor = pos;
            self.modified = true;
        }
        self.desired_col = self.cursor.col;
    }

    /// `.`: run the last change again, with `count` replacing its count.
    fn repeat(&mut self, count: Option<usize>) -> Result<()> {
        let dot = self.dot.clone().ok_or(Error::NoTarget)?;
        let mut cmd = dot.command;
        if count.is_some() {
            cmd.count = count;
        }
        if let Some(extent) = dot.extent {
            self.restore_extent(extent);
        }
        self.replaying = true;
        let result = self.execute(&cmd);
        if result.is_ok() && self.mode.is_input() {
            for key in &dot.inserted {
                self.insert_key(*key);
            }
        }
        self.replaying = false;
        if let Some(dot) = self.dot.as_mut().filter(|_| count.is_some()) {
            dot.command.count = count;
        }
        result
    }

    /// `<C-g>`
    fn file_info(&self) -> String {
        let modified = if self.modified { " [Modified]" } else { "" };
        if self.buffer.is_blank() {
            return format!("\"{}\"{modified} --No lines in buffer--", self.name);
        }
        let lines = self.buffer.line_count();
        let noun = if lines == 1 { "line" } else { "lines" };
        let pct = (self.cursor.line + 1) * 100 / lines;
        format!("\"{}\"{modified} {lines} {noun} --{pct}%--", self.name)
    }

    // ── Edits ──

    /// Replace `range` with `text`, recording it for undo and moving marks
    /// that sit below it.
    pub(crate) fn edit(&mut self, range: Range, text: &str) {
        let start_off = self.buffer.offset_of(range.start);
        let end_off = self.buffer.offset_of(range.end).max(start_off);
        let start = self.buffer.position_of(start_off);
        let end = self.buffer.position_of(end_off);
        let range = Range::new(start, end);
        let removed = self.buffer.slice(range);
        if removed.is_empty() && text.is_empty() {
            return;
        }
        let line_gone = end.col >= self.buffer.line_len(end.line);
        self.buffer.replace(range, text);
        trace!(target: "engine.session", ?range, removed = removed.len(), inserted = text.len(), "edit");
        self.shift_marks(start, end, &removed, text, line_gone);
        self.history.record(start, removed, text.to_string());
        self.modified = true;
        let last = end_after(start, text);
        self.changed = Some(match self.changed {
            Some((a, b)) => (a.min(start), b.max(last)),
            None => (start, last),
        });
    }

    /// Keep marks on their text across an edit from `start` to `end`.
    /// `end_at_eol` says the edit ran to the end of its last line.
    fn shift_marks(
        &mut self,
        start: Position,
        end: Position,
        removed: &str,
        inserted: &str,
        end_at_eol: bool,
    ) {
        let removed_lines = end.line - start.line;
        let added = inserted.matches('\n').count();
        if removed_lines == 0 && added == 0 {
            return;
        }
        #[allow(clippy::cast_possible_wrap)]
        let delta = added as isize - removed_lines as isize;
        let whole_lines = start.col == 0 && end.col == 0 && inserted.is_empty();
        let tail_lines = removed.starts_with('\n') && end_at_eol && inserted.is_empty();
        let line_insert = start.col == 0 && removed_lines == 0 && inserted.ends_with('\n');
        let (dropped, shift_from) = if whole_lines {
            (start.line..end.line, end.line)
        } else if tail_lines {
            (start.line + 1..end.line + 1, end.line + 1)
        } else if line_insert {
            (0..0, start.line)
        } else {
            (0..0, end.line + 1)
        };
        let collapse_to = start.line + added;
        let name = self.name.clone();
        self.marks.adjust(&name, |line| {
            if dropped.contains(&line) {
                None
            } else if line >= shift_from {
                Some(line.saturating_add_signed(delta))
            } else if line > start.line {
                Some(collapse_to)
            } else {
                Some(line)
            }
        });
    }

    // ── Motions ──

    fn move_by(&mut self, motion: &Motion, count: Option<usize>) -> Result<()> {
        let target = self.target(motion, count, Purpose::Move)?;
        if target.jump {
            self.jumps.push(self.cursor);
            self.marks.remember('\'', self.cursor);
        }
        self.cursor = target.pos;
        match target.column {
            Column::Keep => {}
            Column::Update => self.desired_col = target.pos.col,
            Column::LineEnd => self.desired_col = usize::MAX,
        }
        Ok(())
    }

    /// Resolve a motion, including the ones that read session state.
    pub(crate) fn target(
        &mut self,
        motion: &Motion,
        count: Option<usize>,
        purpose: Purpose,
    ) -> Result<Target> {
        let n = count.unwrap_or(1).max(1);
        match motion {
            Motion::RepeatFind { reverse } => {
                let (kind, ch) = self.last_find.ok_or(Error::NoTarget)?;
                let kind = if *reverse { kind.reversed() } else { kind };
                let pos = find_char(&self.buffer, self.cursor, kind, ch, n, true)
                    .ok_or(Error::NoTarget)?;
                let mk = if kind.is_forward() {
                    MotionKind::Inclusive
                } else {
                    MotionKind::Exclusive
                };
                Ok(Target::new(pos, mk, Column::Update))
            }
            Motion::Search { forward, text } => {
                self.search_target(SearchDirection::from_forward(*forward), text, n)
            }
            Motion::SearchNext { reverse } => {
                let last = self.search.last().cloned().ok_or(Error::NoPreviousPattern)?;
                let direction = if *reverse {
                    last.direction.opposite()
                } else {
                    last.direction
                };
                self.search_from(&last, direction, self.cursor, n)
            }
            Motion::SearchWord { forward } => {
                let (word, start) =
                    word_under_cursor(&self.buffer, self.cursor).ok_or(Error::NoTarget)?;
                let direction = SearchDirection::from_forward(*forward);
                let last = LastSearch {
                    pattern: star_pattern(&word),
                    direction,
                    offset: SearchOffset::None,
                };
                self.search.remember(&last.pattern);
                self.search.set_last(last.clone());
                self.search_from(&last, direction, self.cursor.with_col(start), n)
            }
            Motion::Mark { name, exact } => self.mark_target(*name, *exact),
            _ => {
                if let Motion::Find { kind, ch } = motion {
                    self.last_find = Some((*kind, *ch));
                }
                let ctx = MotionContext {
                    options: &self.options,
                    desired_col: self.desired_col,
                    purpose,
                    visual: self.mode.is_visual(),
                };
                resolve(&self.buffer, self.cursor, motion, count, &ctx).ok_or(Error::NoTarget)
            }
        }
    }

    fn mark_target(&mut self, name: char, exact: bool) -> Result<Target> {
        let pos = match self.mark(name)? {
            MarkTarget::Here(pos) => self.buffer.clamp(pos, false),
            MarkTarget::Elsewhere { buffer, pos } => {
                self.request = Some(HostRequest::JumpToMark { buffer, pos });
                return Err(Error::NoTarget);
            }
        };
        let target = if exact {
            Target::new(pos, MotionKind::Exclusive, Column::Update)
        } else {
            let line_start = Position::new(pos.line, first_non_blank(&self.buffer, pos.line));
            Target::new(line_start, MotionKind::Linewise, Column::Update)
        };
        Ok(target.jump())
    }

    // ── Search ──

    /// `/` and `?` with the typed text. An empty pattern reuses the last
    /// one, and an empty text its offset too.
    fn search_target(&mut self, direction: SearchDirection, text: &str, n: usize) -> Result<Target> {
        let delimiter = direction.prefix();
        let (pattern, offset) = split_offset(text, delimiter);
        let (pattern, offset) = if pattern.is_empty() {
            let last = self.search.last().ok_or(Error::NoPreviousPattern)?;
            let offset = if text.is_empty() { last.offset } else { offset };
            (last.pattern.clone(), offset)
        } else {
            (pattern.to_string(), offset)
        };
        let last = LastSearch {
            pattern,
            direction,
            offset,
        };
        self.search.set_last(last.clone());
        self.search_from(&last, direction, self.cursor, n)
    }

    /// The `n`th match of `search` from `from`. Matches are compared by where
    /// they would put the cursor, so `/foo/e` followed by `n` moves on.
    fn search_from(
        &mut self,
        search: &LastSearch,
        direction: SearchDirection,
        from: Position,
        n: usize,
    ) -> Result<Target> {
        let pattern = compile(&search.pattern, search.direction.prefix(), &self.options)?;
        let visual = self.last_visual.map(|v| v.bounds());
        let not_found = || Error::PatternNotFound(search.pattern.clone());
        let landings: Vec<(Position, MotionKind)> = find_all(&self.buffer, &pattern, visual)
            .into_iter()
            .map(|m| self.landing(m, search.offset))
            .collect();
        let key = |pos: Position| self.buffer.clamp(pos, false);
        let mut at = key(from);
        let mut chosen = None;
        let mut wrapped = false;
        for _ in 0..n {
            let next = match direction {
                SearchDirection::Forward => landings.iter().find(|(pos, _)| key(*pos) > at),
                SearchDirection::Backward => landings.iter().rev().find(|(pos, _)| key(*pos) < at),
            };
            let next = match next {
                Some(found) => found,
                None if self.options.wrapscan => {
                    wrapped = true;
                    let edge = match direction {
                        SearchDirection::Forward => landings.first(),
                        SearchDirection::Backward => landings.last(),
                    };
                    edge.ok_or_else(not_found)?
                }
                None => return Err(not_found()),
            };
            at = key(next.0);
            chosen = Some(*next);
        }
        let (pos, kind) = chosen.ok_or_else(not_found)?;
        if wrapped {
            self.set_status(match direction {
                SearchDirection::Forward => "search hit BOTTOM, continuing at TOP".to_string(),
                SearchDirection::Backward => "search hit TOP, continuing at BOTTOM".to_string(),
            });
        }
        debug!(target: "engine.search", pattern = %search.pattern, ?pos, "found");
        Ok(Target::new(pos, kind, Column::Update).jump())
    }

    /// Where a match puts the cursor after `offset`.
    fn landing(&self, m: Match, offset: SearchOffset) -> (Position, MotionKind) {
        let buf = &self.buffer;
        match offset {
            SearchOffset::None => (buf.clamp(m.start, false), MotionKind::Exclusive),
            SearchOffset::Lines(k) => {
                let line = step(m.start.line, k, buf.line_count() - 1);
                (Position::new(line, 0), MotionKind::Linewise)
            }
            SearchOffset::End(k) => {
                let start = buf.offset_of(m.start);
                let last = buf.offset_of(m.end).saturating_sub(1).max(start);
                let at = step(last, k, buf.len_chars().saturating_sub(1));
                (buf.position_of(at), MotionKind::Inclusive)
            }
            SearchOffset::Start(k) => {
                let at = step(buf.offset_of(m.start), k, buf.len_chars());
                (buf.position_of(at), MotionKind::Exclusive)
            }
        }
    }
}

/// `base + by`, kept within `0..=max`.
fn step(base: usize, by: i64, max: usize) -> usize {
    let amount = usize::try_from(by.unsigned_abs()).unwrap_or(usize::MAX);
    let moved = if by < 0 {
        base.saturating_sub(amount)
    } else {
        base.saturating_add(amount)
    };
    moved.min(max)
}
