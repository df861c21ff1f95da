// SPDX-License-Identifier: MIT
//
// n-keys — Key events and Vim key notation for n-vi.
//
// The interpreter never sees raw terminal bytes. Hosts hand it
// structured `KeyEvent`s, either built directly or parsed from the
// human-readable notation Vim uses in its documentation and mappings:
// `dw`, `ci(`, `<Esc>`, `<C-a>`, `<S-BS>`, `<lt>`.

pub mod key;
pub mod notation;

pub use key::{KeyCode, KeyEvent, Modifiers};
pub use notation::{ParseError, parse_keys};
