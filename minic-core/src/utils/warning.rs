use std::{io, path::PathBuf, rc::Rc, sync::{atomic::{AtomicUsize, Ordering}, Arc, RwLock, RwLockWriteGuard}};

use termcolor::Buffer;

use crate::parser::prelude::ParseWarning;
use super::diagnostic::{Diagnostic, Label, Level, SourceLocation};

pub trait WarningEmitterIO {
    fn emit_warning(&self, warning: Warning);
}

#[derive(Debug, Clone, Copy)]
pub struct NullWarningEmitterIO;

impl WarningEmitterIO for NullWarningEmitterIO {
    fn emit_warning(&self, _warning: Warning) {}
}

/// Collects warnings in memory, mostly for tests.
#[derive(Debug, Default, Clone)]
pub struct VectorWarningEmitterIO {
    pub warnings: Arc<RwLock<Vec<Warning>>>
}

impl VectorWarningEmitterIO {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Warning> {
        let mut warnings = self.write_lock();
        std::mem::take(&mut *warnings)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Vec<Warning>> {
        self.warnings.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WarningEmitterIO for VectorWarningEmitterIO {
    fn emit_warning(&self, warning: Warning) {
        let mut warnings = self.write_lock();

        warnings.push(warning);
    }
}

pub struct WarningEmitter {
    count: Arc<AtomicUsize>,
    emitter: Rc<dyn WarningEmitterIO>
}

impl WarningEmitter {
    pub fn new(emitter: Rc<dyn WarningEmitterIO>) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            emitter,
        }
    }

    pub fn null() -> Self {
        Self::new(Rc::new(NullWarningEmitterIO))
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn emit(&self, warning: Warning) {
        _ = self.count.fetch_add(1, Ordering::Relaxed);
        self.emitter.emit_warning(warning);
    }
}

/// Emits parser warnings tagged with the file they were found in.
pub struct SourceWarningEmitter {
    path: PathBuf,
    src: String,
    emitter: WarningEmitter,
}

impl SourceWarningEmitter {
    pub fn new(path: PathBuf, src: String, emitter: WarningEmitter) -> Self {
        Self {
            path,
            src,
            emitter,
        }
    }

    pub fn emit(&self, warning: ParseWarning) {
        self.emitter.emit(Warning::Parse {
            path: self.path.clone(),
            src: self.src.clone(),
            warning,
        });
    }

    pub fn count(&self) -> usize {
        self.emitter.count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    Parse {
        path: PathBuf,
        src: String,
        warning: ParseWarning
    }
}

impl Warning {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();

        if let Err(err) = self.pretty(&mut nocolor) {
            log::error!("failed to render warning: {err}");
        }

        String::from_utf8_lossy(&nocolor.into_inner()).into_owned()
    }

    pub fn pretty(&self, buf: &mut Buffer) -> io::Result<()> {
        use std::io::Write;

        self.to_diagnostic().write(buf)?;
        buf.write_all(b"\n")
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Warning::Parse {
                path,
                src,
                warning
            } => {
                let (title, text, label, extra_labels) = match warning {
                    ParseWarning::ShadowedVariable { name, location, outer } => (
                        "Shadowed variable",
                        String::new(),
                        Label {
                            text: Some(format!("`{name}` hides a variable of an enclosing scope")),
                            span: location.span,
                        },
                        vec![Label {
                            text: Some("outer declaration".into()),
                            span: outer.span,
                        }]
                    ),
                    ParseWarning::UnusedVariable { name, location } => (
                        "Unused variable",
                        format!("hint: rename it to `_{name}` if this is intended"),
                        Label {
                            text: Some("This value is never used".into()),
                            span: location.span,
                        },
                        vec![]
                    ),
                    ParseWarning::UnreachableCode { location } => (
                        "Unreachable code",
                        String::new(),
                        Label {
                            text: Some("this statement never runs".into()),
                            span: location.span,
                        },
                        vec![]
                    ),
                };

                Diagnostic {
                    title: title.into(),
                    text,
                    level: Level::Warning,
                    location: Some(SourceLocation {
                        src,
                        path: path.to_path_buf(),
                        label,
                        extra_labels,
                    }),
                }
            }
        }
    }
}
