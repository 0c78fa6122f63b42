//! Bootstrap statements
//!
//! Run in order between registration and the entrypoint:
//! 1. log probe through `androidembed`
//! 2. base imports
//! 3. path setup (only with a bundle): argv, `site-packages`, `.` first
//! 4. stream shim: stdout/stderr become a line-buffered writer into
//!    `androidembed.log`, followed by a few diagnostic prints

use hearth_core::SearchPath;
use std::fmt::Write as _;
use std::path::Path;

/// Name of the native log module registered before initialization.
pub const LOG_MODULE: &str = "androidembed";

pub const LOG_PROBE: &str =
    "import androidembed\nandroidembed.log('testing python print redirection')";

pub const IMPORTS: &str = "import io, sys, posix\n";

pub const ARGV: &str = "import sys\n\
sys.argv = ['notaninterpreterreally']\n\
from os.path import realpath, join, dirname";

pub const CWD_FIRST: &str = "sys.path = sys.path if '.' in sys.path else ['.'] + sys.path";

/// Buffers partial writes until a newline, strips NUL from each complete
/// line and forwards it to the log callback.
pub const STREAM_SHIM: &str = r#"class LogFile(io.IOBase):
    def __init__(self):
        self.__buffer = ''
    def readable(self):
        return False
    def writable(self):
        return True
    def write(self, s):
        s = self.__buffer + s
        lines = s.split('\n')
        for l in lines[:-1]:
            androidembed.log(l.replace('\x00', ''))
        self.__buffer = lines[-1]
sys.stdout = sys.stderr = LogFile()
print('Android path', sys.path)
import os
print('os.environ is', os.environ)
print('Android kivy bootstrap done. __name__ is', __name__)"#;

/// A labelled block handed to [`Interpreter::run_source`](crate::Interpreter::run_source).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub label: &'static str,
    pub source: String,
}

impl Statement {
    fn new(label: &'static str, source: impl Into<String>) -> Self {
        Self {
            label,
            source: source.into(),
        }
    }
}

/// Full bootstrap sequence. Path statements are skipped without a bundle.
pub fn statements(search_path: Option<&SearchPath>) -> Vec<Statement> {
    let mut statements = vec![
        Statement::new("log-probe", LOG_PROBE),
        Statement::new("imports", IMPORTS),
    ];
    if let Some(search_path) = search_path {
        statements.push(Statement::new("argv", ARGV));
        statements.push(Statement::new(
            "site-packages",
            site_packages(&search_path.site_packages()),
        ));
        statements.push(Statement::new("cwd-first", CWD_FIRST));
    }
    statements.push(Statement::new("stream-shim", STREAM_SHIM));
    statements
}

pub fn site_packages(path: &Path) -> String {
    format!(
        "site_packages_path = {}\n\
         if site_packages_path not in sys.path:\n    sys.path.append(site_packages_path)",
        string_literal(&path.to_string_lossy())
    )
}

pub fn exit(code: i32) -> String {
    format!("import sys; sys.exit({code})\n")
}

/// Execute `path` in the current globals. Compiled files skip the 16-byte
/// header and are unmarshalled; sources are compiled under their own name.
pub fn run_file(path: &Path) -> String {
    let path = string_literal(&path.to_string_lossy());
    format!(
        "__file__ = {path}\n\
         import marshal as _hearth_marshal\n\
         with open(__file__, 'rb') as _hearth_file:\n    _hearth_data = _hearth_file.read()\n\
         if __file__.endswith('.pyc'):\n\
         \x20   _hearth_code = _hearth_marshal.loads(_hearth_data[16:])\n\
         else:\n    _hearth_code = compile(_hearth_data, __file__, 'exec')\n\
         del _hearth_marshal, _hearth_file, _hearth_data\n\
         exec(_hearth_code, globals())\n"
    )
}

/// Single-quoted literal safe to splice into a statement.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\x7f' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
