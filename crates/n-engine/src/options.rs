//! Interpreter options and the `set` directive syntax.
//!
//! [`Options`] holds every value the grammar consults. Hosts build it from a
//! TOML document ([`Options::from_toml_str`], [`Options::load`]) and adjust it
//! with Vim-style directives ([`parse_set`] + [`Options::apply`]).
//!
//! | Full name    | Abbrev | Type    | Default |
//! |--------------|--------|---------|---------|
//! | `tabstop`    | `ts`   | integer | 8       |
//! | `shiftwidth` | `sw`   | integer | 8       |
//! | `expandtab`  | `et`   | bool    | false   |
//! | `autoindent` | `ai`   | bool    | true    |
//! | `ignorecase` | `ic`   | bool    | false   |
//! | `smartcase`  | `scs`  | bool    | false   |
//! | `wrapscan`   | `ws`   | bool    | true    |
//! | `whichwrap`  | `ww`   | string  | `b,s`   |
//! | `textwidth`  | `tw`   | integer | 80      |
//! | `scroll`     | `scr`  | integer | 0       |
//! | `lines`      |        | integer | 24      |
//!
//! `scroll = 0` means half of `lines`, the viewport height the host reports.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub tabstop: usize,
    pub shiftwidth: usize,
    pub expandtab: bool,
    pub autoindent: bool,
    pub ignorecase: bool,
    pub smartcase: bool,
    pub wrapscan: bool,
    pub whichwrap: String,
    pub textwidth: usize,
    pub scroll: usize,
    pub lines: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tabstop: 8,
            shiftwidth: 8,
            expandtab: false,
            autoindent: true,
            ignorecase: false,
            smartcase: false,
            wrapscan: true,
            whichwrap: "b,s".to_string(),
            textwidth: 80,
            scroll: 0,
            lines: 24,
        }
    }
}

impl Options {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let opts = Self::from_toml_str(&text)?;
        debug!(target: "engine.config", path = %path.display(), "options_loaded");
        Ok(opts)
    }

    /// Whether `whichwrap` lets the given key cross line boundaries.
    /// Keys are the flags Vim uses: `b` (`<BS>`), `s` (`<Space>`), `h`, `l`.
    #[must_use]
    pub fn wraps(&self, flag: char) -> bool {
        self.whichwrap
            .split(',')
            .any(|f| f.len() == 1 && f.starts_with(flag))
    }

    /// Effective `shiftwidth`: 0 means "use tabstop".
    #[must_use]
    pub const fn shift(&self) -> usize {
        if self.shiftwidth == 0 {
            self.tabstop
        } else {
            self.shiftwidth
        }
    }

    /// Lines moved by `<C-u>`/`<C-d>`.
    #[must_use]
    pub const fn scroll_amount(&self) -> usize {
        if self.scroll == 0 {
            let half = self.lines / 2;
            if half == 0 { 1 } else { half }
        } else {
            self.scroll
        }
    }

    /// Apply one parsed directive.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<()> {
        match directive {
            SetDirective::On(name) => *self.bool_mut(name)? = true,
            SetDirective::Off(name) => *self.bool_mut(name)? = false,
            SetDirective::Toggle(name) => {
                let flag = self.bool_mut(name)?;
                *flag = !*flag;
            }
            SetDirective::Assign(name, value) => self.assign(name, value)?,
        }
        Ok(())
    }

    /// Parse and apply a whole directive string (`"ic scs ts=4"`).
    pub fn set(&mut self, args: &str) -> Result<()> {
        for directive in parse_set(args) {
            if let Err(e) = self.apply(&directive) {
                warn!(target: "engine.config", ?directive, error = %e, "set_rejected");
                return Err(e);
            }
        }
        Ok(())
    }

    fn bool_mut(&mut self, name: &str) -> Result<&mut bool> {
        Ok(match canonical(name) {
            Some("expandtab") => &mut self.expandtab,
            Some("autoindent") => &mut self.autoindent,
            Some("ignorecase") => &mut self.ignorecase,
            Some("smartcase") => &mut self.smartcase,
            Some("wrapscan") => &mut self.wrapscan,
            _ => return Err(Error::UnknownOption(name.to_string())),
        })
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<()> {
        let canon = canonical(name).ok_or_else(|| Error::UnknownOption(name.to_string()))?;
        if canon == "whichwrap" {
            self.whichwrap = value.to_string();
            return Ok(());
        }
        let n: usize = value
            .parse()
            .map_err(|_| Error::InvalidOptionValue(format!("{name}={value}")))?;
        match canon {
            "tabstop" if n > 0 => self.tabstop = n,
            "shiftwidth" => self.shiftwidth = n,
            "textwidth" => self.textwidth = n,
            "scroll" => self.scroll = n,
            "lines" if n > 0 => self.lines = n,
            _ => return Err(Error::InvalidOptionValue(format!("{name}={value}"))),
        }
        Ok(())
    }
}

/// Map full names and abbreviations to the full name.
fn canonical(name: &str) -> Option<&'static str> {
    Some(match name {
        "tabstop" | "ts" => "tabstop",
        "shiftwidth" | "sw" => "shiftwidth",
        "expandtab" | "et" => "expandtab",
        "autoindent" | "ai" => "autoindent",
        "ignorecase" | "ic" => "ignorecase",
        "smartcase" | "scs" => "smartcase",
        "wrapscan" | "ws" => "wrapscan",
        "whichwrap" | "ww" => "whichwrap",
        "textwidth" | "tw" => "textwidth",
        "scroll" | "scr" => "scroll",
        "lines" => "lines",
        _ => return None,
    })
}

/// Returns `true` if `name` is a known boolean option.
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(
        canonical(name),
        Some("expandtab" | "autoindent" | "ignorecase" | "smartcase" | "wrapscan")
    )
}

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// One parsed `set` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option`
    On(String),
    /// `nooption`
    Off(String),
    /// `option!` or `invoption`
    Toggle(String),
    /// `option=value`
    Assign(String, String),
}

/// Split a directive string on whitespace and parse each argument.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse one argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `number`-style names start with "no" too, so only strip a prefix that
    // leaves a real boolean option behind.
    if let Some(name) = arg.strip_prefix("no").filter(|n| is_bool_option(n)) {
        return SetDirective::Off(name.to_string());
    }
    if let Some(name) = arg.strip_prefix("inv").filter(|n| is_bool_option(n)) {
        return SetDirective::Toggle(name.to_string());
    }
    SetDirective::On(arg.to_string())
}
