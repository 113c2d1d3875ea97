use std::{io, path::{Path, PathBuf}};

use termcolor::Buffer;
use thiserror::Error;

use crate::environment::prelude::SemanticErrorType;
use super::diagnostic::{Diagnostic, Label, Level, SourceLocation};
use super::problem::{Category, Problem};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("compilation failed with {} error(s)", .errors.len())]
    Compile {
        path: PathBuf,
        src: String,
        errors: Vec<Problem>
    },
    #[error("evaluation failed with {} error(s)", .errors.len())]
    Runtime {
        path: PathBuf,
        src: String,
        errors: Vec<Problem>
    },
    #[error("IO operation failed")]
    StdIo {
        err: io::ErrorKind
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::StdIo { err: value.kind() }
    }
}

impl Error {
    /// Problems carried by a compile or runtime failure.
    pub fn problems(&self) -> &[Problem] {
        match self {
            Error::Compile { errors, .. } | Error::Runtime { errors, .. } => errors,
            Error::StdIo { .. } => &[],
        }
    }

    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();

        if let Err(err) = self.pretty(&mut nocolor) {
            log::error!("failed to render diagnostics: {err}");
        }

        String::from_utf8_lossy(&nocolor.into_inner()).into_owned()
    }

    pub fn pretty(&self, buf: &mut Buffer) -> io::Result<()> {
        use std::io::Write;

        for diagnostic in self.to_diagnostics() {
            diagnostic.write(buf)?;
            writeln!(buf)?;
        }

        Ok(())
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Compile { path, src, errors } => errors.iter()
                .map(|problem| problem_diagnostic(path, src, problem, false))
                .collect(),
            Error::Runtime { path, src, errors } => errors.iter()
                .map(|problem| problem_diagnostic(path, src, problem, true))
                .collect(),
            Error::StdIo { err, } => {
                vec![Diagnostic {
                    title: "Standard IO error".into(),
                    text: format!("{err}"),
                    level: Level::Error,
                    location: None,
                }]
            }
        }
    }
}

fn problem_diagnostic<'a>(
    path: &Path,
    src: &'a str,
    problem: &Problem,
    runtime: bool
) -> Diagnostic<'a> {
    let title = match (problem.category(), runtime) {
        (Category::Lexical, _) => "Lexical error",
        (Category::Syntactic, _) => "Syntax error",
        (Category::Semantic, false) => "Semantic error",
        (Category::Semantic, true) => "Runtime error",
    };

    let extra_labels = match problem.semantic() {
        Some(SemanticErrorType::DuplicateDeclaration { previous, .. }) => vec![Label {
            text: Some("first declared here".into()),
            span: previous.span,
        }],
        _ => vec![]
    };

    Diagnostic {
        title: title.into(),
        text: problem.kind.hints().join("\n"),
        level: Level::Error,
        location: Some(SourceLocation {
            src,
            path: path.to_path_buf(),
            label: Label {
                text: Some(problem.message()),
                span: problem.location.span,
            },
            extra_labels,
        }),
    }
}
