use std::{fs::File, io::{BufReader, Write}, path::PathBuf, rc::Rc};

use utf8_chars::BufReadCharsExt;

use crate::{
    environment::prelude::SymbolTable,
    eval::prelude::{Evaluator, EvaluatorOptions},
    lexer::prelude::{tokenize, tokenize_stream, Lexed},
    parser::prelude::{parse_tokens, Program},
    utils::prelude::{Error, SourceWarningEmitter, WarningEmitter, WarningEmitterIO},
};

/// A program that passed every compile-time check.
#[derive(Debug)]
pub struct Analyzed {
    pub path: PathBuf,
    pub src: String,
    pub program: Program,
    pub symbols: SymbolTable,
}

/// Lexes and parses `src`, emitting warnings as they are found.
pub fn analyze_source(
    path: PathBuf,
    src: String,
    warnings: Rc<dyn WarningEmitterIO>,
) -> Result<Analyzed, Error> {
    let lexed = tokenize(&src);

    check(path, src, lexed, warnings)
}

/// Like `analyze_source`, but streams the file through the lexer as UTF-8
/// characters.
pub fn analyze(
    path: PathBuf,
    warnings: Rc<dyn WarningEmitterIO>,
) -> Result<Analyzed, Error> {
    let file = File::open(&path)?;
    let file_size = file.metadata()?.len() as usize;

    let mut src = String::with_capacity(file_size);
    let mut failure = None;
    let mut reader = BufReader::new(file);

    let stream = reader.chars()
        .map_while(|c| match c {
            Ok(c) => {
                src.push(c);
                Some(c)
            },
            Err(err) => {
                failure = Some(err);
                None
            }
        });

    let lexed = tokenize_stream(stream);

    if let Some(err) = failure {
        return Err(err.into());
    }

    check(path, src, lexed, warnings)
}

fn check(
    path: PathBuf,
    src: String,
    lexed: Lexed,
    warnings: Rc<dyn WarningEmitterIO>,
) -> Result<Analyzed, Error> {
    log::debug!("analyzing {} ({} token(s))", path.display(), lexed.tokens.len());

    let parsed = parse_tokens(lexed);

    let warnings = SourceWarningEmitter::new(
        path.clone(),
        src.clone(),
        WarningEmitter::new(warnings)
    );

    for warning in parsed.warnings {
        warnings.emit(warning);
    }

    if !parsed.errors.is_empty() {
        return Err(Error::Compile { path, src, errors: parsed.errors });
    }

    Ok(Analyzed {
        path,
        src,
        program: parsed.program,
        symbols: parsed.symbols,
    })
}

/// Evaluates an analyzed program, writing `print` output to `output`.
pub fn run<W: Write>(
    analyzed: Analyzed,
    output: W,
    options: EvaluatorOptions,
) -> Result<(), Error> {
    let Analyzed { path, src, program, symbols } = analyzed;

    let mut evaluator = Evaluator::new(&program, symbols, output)
        .with_options(options);

    let errors = evaluator.run().to_vec();

    if let Some(err) = evaluator.take_io_error() {
        return Err(err.into());
    }

    match errors.is_empty() {
        true => Ok(()),
        false => Err(Error::Runtime { path, src, errors })
    }
}
