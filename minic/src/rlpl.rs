use std::io::Write;

use minic_core::lexer::prelude::{tokenize, TokenKind};

const PROMPT: &str = ">> ";

pub fn start() -> std::io::Result<()> {
	let stdin = std::io::stdin();

	loop {
		let mut input = String::from("");

		print!("{}", PROMPT);
		std::io::stdout().flush()?;

		if stdin.read_line(&mut input)? == 0 {
			return Ok(());
		}

		if let Some('\n') = input.chars().next_back() {
			input.pop();
		}
		if let Some('\r') = input.chars().next_back() {
			input.pop();
		}

		match input.as_str() {
			"" => {},
			".exit" => return Ok(()),
			_ => {
				let lexed = tokenize(&input);

				for token in lexed.tokens.iter().filter(|token| token.kind != TokenKind::Eof) {
					println!("{}:{}\t{:?}\t{:?}", token.line, token.column, token.kind, token.lexeme);
				}

				for err in lexed.errors {
					let (message, hints) = err.details();
					println!("[at {}:{}] Lexical Error: {}", err.location.line, err.location.column, message);
					if !hints.is_empty() {
						println!("{}", hints.join("\n"));
					}
				}
			}
		}
	}
}
