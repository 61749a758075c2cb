//! Text-level optimization passes over generated JavaScript.
//!
//! Each pass implements the `TextPass` trait and rewrites the output text in
//! place. Passes are composed via the `PassManager`; which passes run is
//! decided by the optimization level and the compile options.

use crate::options::CompileOptions;
use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Pass infrastructure
// ============================================================================

/// A single rewrite of the generated text.
pub trait TextPass {
    fn name(&self) -> &'static str;
    fn run(&self, code: &mut String);
}

/// Runs a sequence of `TextPass`es in order.
pub struct PassManager {
    passes: Vec<Box<dyn TextPass>>,
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PassManager {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add(&mut self, pass: Box<dyn TextPass>) {
        self.passes.push(pass);
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn run_all(&self, code: &mut String) {
        for pass in &self.passes {
            log::trace!("running text pass '{}'", pass.name());
            pass.run(code);
        }
    }

    /// The staged pipeline for `level` (clamped to 0..=3):
    /// clean at 1, whitespace optimization at 2, minification at 3.
    pub fn for_level(level: u8, options: &CompileOptions) -> Self {
        let mut pm = Self::new();
        if level >= 1 {
            pm.add(Box::new(CleanPass));
        }
        if level >= 2 && options.flag("optimize") {
            pm.add(Box::new(BlankLinePass));
        }
        if level >= 3 {
            let minify = options.flag("minify");
            let pass = MinifyPass {
                remove_comments: minify || options.flag("removeComments"),
                remove_whitespace: minify || options.flag("removeWhitespace"),
            };
            if pass.remove_comments || pass.remove_whitespace {
                pm.add(Box::new(pass));
            }
        }
        pm
    }
}

/// Run the staged pipeline for `level` over `code`.
pub fn optimize(code: &str, level: u8, options: &CompileOptions) -> String {
    let pm = PassManager::for_level(level.min(3), options);
    log::debug!("optimizing at level {} with passes {:?}", level, pm.pass_names());
    let mut out = code.to_string();
    pm.run_all(&mut out);
    out
}

// ============================================================================
// Clean: byte-order mark and line endings
// ============================================================================

/// Strips a leading byte-order mark and normalizes line endings to `\n`.
pub struct CleanPass;

impl TextPass for CleanPass {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn run(&self, code: &mut String) {
        if let Some(rest) = code.strip_prefix('\u{feff}') {
            *code = rest.to_string();
        }
        if code.contains('\r') {
            *code = code.replace("\r\n", "\n").replace('\r', "\n");
        }
    }
}

// ============================================================================
// Blank lines: trailing whitespace and runs of empty lines
// ============================================================================

static TRAILING_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("valid trailing-whitespace pattern"));
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-run pattern"));

/// Strips trailing whitespace from every line, then collapses runs of blank
/// lines to a single one. Applying it twice changes nothing.
pub struct BlankLinePass;

impl TextPass for BlankLinePass {
    fn name(&self) -> &'static str {
        "optimize"
    }

    fn run(&self, code: &mut String) {
        let stripped = TRAILING_WHITESPACE.replace_all(code, "");
        let collapsed = BLANK_RUNS.replace_all(&stripped, "\n\n");
        *code = collapsed.into_owned();
    }
}

// ============================================================================
// Minify: comments and whitespace
// ============================================================================

/// Removes comments and/or redundant whitespace. Both halves scan the text
/// token-aware so string, template and regular-expression literals survive.
pub struct MinifyPass {
    pub remove_comments: bool,
    pub remove_whitespace: bool,
}

impl TextPass for MinifyPass {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn run(&self, code: &mut String) {
        if self.remove_comments {
            *code = strip_comments(code);
        }
        if self.remove_whitespace {
            *code = collapse_whitespace(code);
        }
    }
}

/// Lexical region of the scanner.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    Code,
    Quoted(char),
    Regex { in_class: bool },
    LineComment,
    BlockComment,
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// A `/` starts a regular expression when it cannot be a division, judged by
/// the last significant character before it.
fn slash_starts_regex(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => "(,=:[!&|?{};+-*%<>~^".contains(c),
    }
}

/// Walk `code`, calling `visit` for every character with the region it
/// belongs to. Opening quotes and regex slashes report `Region::Code`; the
/// newline ending a line comment does too.
pub(crate) fn walk(code: &str, mut visit: impl FnMut(char, Region)) {
    let chars: Vec<char> = code.chars().collect();
    let mut region = Region::Code;
    let mut prev_significant: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match region {
            Region::Code => match (c, next) {
                ('/', Some('/')) => {
                    region = Region::LineComment;
                    visit(c, region);
                    visit('/', region);
                    i += 2;
                    continue;
                }
                ('/', Some('*')) => {
                    region = Region::BlockComment;
                    visit(c, region);
                    visit('*', region);
                    i += 2;
                    continue;
                }
                ('/', _) if slash_starts_regex(prev_significant) => {
                    region = Region::Regex { in_class: false };
                    visit(c, Region::Code);
                }
                ('\'' | '"' | '`', _) => {
                    region = Region::Quoted(c);
                    visit(c, Region::Code);
                }
                _ => visit(c, Region::Code),
            },
            Region::Quoted(q) => {
                visit(c, region);
                if c == '\\' {
                    if let Some(n) = next {
                        visit(n, region);
                        i += 2;
                        continue;
                    }
                } else if c == q {
                    region = Region::Code;
                }
            }
            Region::Regex { in_class } => {
                visit(c, region);
                match c {
                    '\\' => {
                        if let Some(n) = next {
                            visit(n, region);
                            i += 2;
                            continue;
                        }
                    }
                    '[' => region = Region::Regex { in_class: true },
                    ']' if in_class => region = Region::Regex { in_class: false },
                    '/' if !in_class => region = Region::Code,
                    '\n' => region = Region::Code,
                    _ => {}
                }
            }
            Region::LineComment => {
                if c == '\n' {
                    region = Region::Code;
                }
                visit(c, region);
            }
            Region::BlockComment => {
                visit(c, region);
                if c == '*' && next == Some('/') {
                    visit('/', region);
                    region = Region::Code;
                    i += 2;
                    continue;
                }
            }
        }
        if !c.is_whitespace() && region != Region::LineComment && region != Region::BlockComment {
            prev_significant = Some(c);
        }
        i += 1;
    }
}

/// Like [`walk`], but comments are reported once as a single `None` so
/// callers can substitute a separator.
pub(crate) fn scan(code: &str, mut emit: impl FnMut(Option<(char, Region)>)) {
    let mut in_comment = false;
    walk(code, |c, region| match region {
        Region::LineComment | Region::BlockComment => {
            if !in_comment {
                in_comment = true;
                emit(None);
            }
        }
        _ => {
            in_comment = false;
            emit(Some((c, region)));
        }
    });
}

/// Remove `//` and `/* */` comments outside literals. A removed block comment
/// leaves a space so the tokens around it stay apart.
pub fn strip_comments(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut pending_space = false;
    scan(code, |item| match item {
        None => pending_space = true,
        Some((c, _)) => {
            if pending_space && c != '\n' && !out.ends_with(char::is_whitespace) {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    });
    // Lines that held only a comment are left empty; drop them.
    out.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse whitespace runs outside literals. A run becomes a single space
/// only where dropping it would merge two tokens (`var x`, `a + +b`).
pub fn collapse_whitespace(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut pending_space = false;
    scan(code, |item| {
        let Some((c, region)) = item else {
            pending_space = true;
            return;
        };
        if region == Region::Code && c.is_whitespace() {
            pending_space = true;
            return;
        }
        if pending_space {
            if let Some(last) = out.chars().last() {
                let merges = (is_word(last) && is_word(c))
                    || (last == '+' && c == '+')
                    || (last == '-' && c == '-')
                    || (last == '/' && c == '/');
                if merges {
                    out.push(' ');
                }
            }
            pending_space = false;
        }
        out.push(c);
    });
    out.trim().to_string()
}
