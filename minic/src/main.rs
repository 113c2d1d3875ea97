mod cli;
mod rlpl;
mod rppl;

use std::{path::PathBuf, process::ExitCode, rc::Rc, time::Instant};

use clap::Parser;
use cli::{
    print_analyzed, print_analyzing, print_finished, print_running, ConsoleLogger
};
use minic_core::{
    driver::{analyze, run},
    eval::prelude::EvaluatorOptions,
    utils::prelude::{Error, Warning, WarningEmitterIO}
};

/// Parsing and evaluation recurse on the native stack once per nesting
/// level and per MiniC call.
const ANALYSIS_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "minic", version, about = "MiniC analyzer and interpreter")]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Performs lexical, syntactical and semantical analysis
    /// and evaluates the program
    Run {
        /// Path of source file
        path: PathBuf,
        /// Iterations a single loop may run before it is stopped
        #[arg(long, default_value_t = EvaluatorOptions::default().max_loop_iterations)]
        max_loop_iterations: usize,
        /// Nested user function calls allowed at once
        #[arg(long, default_value_t = EvaluatorOptions::default().max_call_depth)]
        max_call_depth: usize,
    },
    /// Performs lexical, syntactical and semantical analysis
    Check {
        /// Path of source file
        path: PathBuf,
        /// Print ast instead of parsed source code
        #[arg(long, default_value_t = false)]
        print_ast: bool,
        /// Do not print parsed source code
        #[arg(short, long, default_value_t = false)]
        no_output: bool,
    },
    /// Runs Read Lex Print Loop
    Rlpl,
    /// Runs Read Parse Print Loop
    Rppl
}

fn main() -> ExitCode {
    let args = Args::parse();

    ConsoleLogger::init(args.verbose);

    let result = match args.command {
        Command::Run { path, max_loop_iterations, max_call_depth } => {
            let options = EvaluatorOptions { max_loop_iterations, max_call_depth };

            if let Err(err) = ctrlc::set_handler(|| std::process::exit(130)) {
                log::warn!("could not install Ctrl-C handler: {err}");
            }

            on_large_stack(move || run_file(path, options))
        },
        Command::Check { path, print_ast, no_output } => {
            on_large_stack(move || check_file(path, print_ast, no_output))
        },
        Command::Rlpl => rlpl::start().map_err(Error::from),
        Command::Rppl => rppl::start().map_err(Error::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let buf_writer = cli::stderr_buffer_writer();
            let mut buf = buf_writer.buffer();

            if err.pretty(&mut buf).and_then(|_| buf_writer.print(&buf)).is_err() {
                eprintln!("{err}");
            }

            ExitCode::FAILURE
        }
    }
}

fn on_large_stack(
    job: impl FnOnce() -> Result<(), Error> + Send + 'static
) -> Result<(), Error> {
    let handle = std::thread::Builder::new()
        .name("minic".into())
        .stack_size(ANALYSIS_STACK_SIZE)
        .spawn(job)?;

    match handle.join() {
        Ok(result) => result,
        Err(_) => {
            log::error!("analysis thread panicked");
            Err(Error::StdIo { err: std::io::ErrorKind::Other })
        }
    }
}

fn run_file(path: PathBuf, options: EvaluatorOptions) -> Result<(), Error> {
    print_analyzing(&path.display().to_string());
    let start = Instant::now();

    let analyzed = analyze(path.clone(), Rc::new(ConsoleWarningEmitter))?;

    print_analyzed(start.elapsed());

    print_running(&path.display().to_string());
    let start = Instant::now();

    let stdout = std::io::stdout();
    run(analyzed, stdout.lock(), options)?;

    print_finished(start.elapsed());

    Ok(())
}

fn check_file(path: PathBuf, print_ast: bool, no_output: bool) -> Result<(), Error> {
    print_analyzing(&path.display().to_string());
    let start = Instant::now();

    let analyzed = analyze(path, Rc::new(ConsoleWarningEmitter))?;

    if !no_output {
        if print_ast {
            println!("{:#?}", analyzed.program);
        } else {
            println!("{}", analyzed.program);
        }
    }

    print_analyzed(start.elapsed());

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct ConsoleWarningEmitter;

impl WarningEmitterIO for ConsoleWarningEmitter {
    fn emit_warning(&self, warning: Warning) {
        let buffer_writer = cli::stderr_buffer_writer();
        let mut buffer = buffer_writer.buffer();

        if warning.pretty(&mut buffer).and_then(|_| buffer_writer.print(&buffer)).is_err() {
            log::error!("failed to write warning to stderr");
        }
    }
}
