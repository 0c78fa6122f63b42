//! Recording interpreter for driver and adapter tests

use hearth_core::{BackendError, RuntimeBackend, SearchPath};
use hearth_script::{Interpreter, MainCall, ScriptError};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Initialize(Option<String>),
    Attach,
    Detach,
    Source(String),
    File(PathBuf),
    Report(String),
    Stdout(String),
    Main(String),
    Exit(i32),
    Finalize,
}

#[derive(Default)]
pub struct FakeInterpreter {
    pub events: Mutex<Vec<Event>>,
    pub fail_file: bool,
    pub fail_main: bool,
    pub main_missing: bool,
    pub unreadable_file: bool,
    /// Statements containing this text raise.
    pub fail_source_containing: Option<&'static str>,
    /// Runs inside `initialize`.
    pub on_initialize: Option<Box<dyn Fn() + Send + Sync>>,
}

impl FakeInterpreter {
    fn record(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn exits(&self) -> Vec<i32> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Exit(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events().iter().filter(|event| *event == wanted).count()
    }
}

impl RuntimeBackend for FakeInterpreter {
    type Registration = ();

    fn initialize(&self, search_path: Option<&SearchPath>) -> Result<(), BackendError> {
        self.record(Event::Initialize(search_path.map(SearchPath::primary)));
        if let Some(hook) = &self.on_initialize {
            hook();
        }
        Ok(())
    }

    fn attach(&self) {
        self.record(Event::Attach);
    }

    fn detach(&self, _registration: ()) {
        self.record(Event::Detach);
    }

    fn finalize(&self) -> i32 {
        self.record(Event::Finalize);
        0
    }
}

impl Interpreter for FakeInterpreter {
    fn run_source(&self, source: &str) -> Result<(), ScriptError> {
        self.record(Event::Source(source.to_string()));
        match self.fail_source_containing {
            Some(needle) if source.contains(needle) => {
                Err(ScriptError::raised("RuntimeError", "bootstrap failed"))
            }
            _ => Ok(()),
        }
    }

    fn run_file(&self, path: &Path) -> Result<(), ScriptError> {
        if self.unreadable_file {
            return Err(ScriptError::Open {
                path: path.to_path_buf(),
                reason: "permission denied".into(),
            });
        }
        self.record(Event::File(path.to_path_buf()));
        if self.fail_file {
            return Err(ScriptError::raised("ZeroDivisionError", "division by zero"));
        }
        Ok(())
    }

    fn report_error(&self, error: &ScriptError) {
        self.record(Event::Report(error.to_string()));
    }

    fn write_stdout(&self, text: &str) {
        self.record(Event::Stdout(text.to_string()));
    }

    fn call_main(&self, argument: &str) -> Result<MainCall, ScriptError> {
        if self.main_missing {
            return Ok(MainCall::Missing);
        }
        self.record(Event::Main(argument.to_string()));
        if self.fail_main {
            return Err(ScriptError::raised("ValueError", "bad argument"));
        }
        Ok(MainCall::Called)
    }

    fn request_exit(&self, code: i32) -> Result<(), ScriptError> {
        self.record(Event::Exit(code));
        Ok(())
    }
}
