//! Crate-level behaviour tests.

use std::cell::RefCell;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::command::{CommandOutput, CommandRunner};
use crate::error::PackError;

mod behaviour;

/// Log sink shared between a test and its subscriber's writer.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `action` under a plain-text subscriber admitting events up to
/// `level` on the current thread and returns what it logged.
pub(crate) fn capture_logs<T>(level: tracing::Level, action: impl FnOnce() -> T) -> (T, String) {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(level)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, action);
    let bytes = log.0.lock().expect("log lock").clone();
    (value, String::from_utf8(bytes).expect("log utf8"))
}

/// Runner standing in for cargo.
///
/// Build invocations succeed or fail with the configured diagnostic. The
/// publish invocation writes a module file to `module` and reports it the way
/// cargo's JSON message stream does.
struct StubCargo {
    module: PathBuf,
    build_failure: Option<String>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl CommandRunner for StubCargo {
    fn run(&self, _program: &OsStr, args: &[OsString]) -> Result<CommandOutput, PackError> {
        let joined = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push(joined);

        if let Some(diagnostic) = &self.build_failure {
            return Ok(CommandOutput::new(
                Some(101),
                Vec::new(),
                vec![diagnostic.clone()],
            ));
        }
        if !args.iter().any(|arg| arg == "--message-format") {
            return Ok(CommandOutput::new(Some(0), Vec::new(), Vec::new()));
        }

        fs::write(&self.module, b"module").expect("write module");
        let message = json!({
            "reason": "compiler-artifact",
            "target": { "kind": ["cdylib"] },
            "filenames": [&self.module],
        });
        Ok(CommandOutput::new(
            Some(0),
            vec![message.to_string()],
            Vec::new(),
        ))
    }
}
