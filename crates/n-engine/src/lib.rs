//! # n-engine — Vim keystroke interpreter for n-vi
//!
//! Keys go in, edits come out. The host owns the text and exposes it through
//! [`TextBuffer`]; a [`Session`] does the rest:
//!
//! - **[`command`]** — the key grammar: counts, registers, operators, motions
//! - **[`mode`]** — Normal, Insert, Visual (char, line, block) and Replace
//! - **[`motion`]** — cursor motions and their exclusive/inclusive/linewise kind
//! - **[`text_object`]** — words, sentences, paragraphs, quotes, brackets,
//!   tags, indent blocks, arguments and the whole buffer
//! - **[`operator`]** — `d` `c` `y` `>` `<` `g~` `gu` `gU` `g?` `gq`, put,
//!   join, `r`, `~` and `<C-a>`
//! - **[`register`]** and **[`mark`]** — named storage for text and positions
//! - **[`search`]** — Vim-flavored patterns, offsets and the `/` prompt
//! - **[`history`]** and **[`jumplist`]** — undo steps, the jump list and the
//!   change list
//! - **[`session`]** — ties it together, including dot-repeat
//!
//! ```
//! use n_engine::{Mode, Session};
//!
//! let mut session = Session::from_text("one two three");
//! let outcome = session.feed("wcwTWO<Esc>");
//! assert_eq!(session.buffer().rope().to_string(), "one TWO three");
//! assert_eq!(outcome.mode, Mode::Normal);
//! ```

pub mod buffer;
pub mod command;
pub mod error;
pub mod format;
pub mod history;
pub mod increment;
pub mod jumplist;
pub mod mark;
pub mod mode;
pub mod motion;
pub mod operator;
pub mod options;
pub mod position;
pub mod register;
pub mod search;
pub mod session;
pub mod text_object;
pub mod word;

mod insert;
mod visual;

pub use buffer::{Buffer, TextBuffer};
pub use error::{Error, Result};
pub use mode::{Mode, VisualKind};
pub use options::Options;
pub use position::{Position, Range, Selection};
pub use session::{HostRequest, KeyOutcome, Session};
