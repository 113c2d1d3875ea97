use std::io::Write;

use minic_core::parser::prelude::parse_program;

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
				let parsed = parse_program(&input);

				if !parsed.program.statements.is_empty() {
					println!("{}", parsed.program);
				}

				for problem in &parsed.errors {
					println!("{problem}");
				}

				for warning in &parsed.warnings {
					let location = warning.location();
					println!("[at {}:{}] Warning: {:?}", location.line, location.column, warning);
				}
			}
		}
	}
}
