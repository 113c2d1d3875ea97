use super::error::{LexicalError, LexicalErrorType};
use super::token::{Token, TokenKind, TokenValue};
use std::fmt::Display;
use crate::utils::prelude::{Location, SrcSpan};

pub fn str_to_keyword(word: &str) -> Option<TokenKind> {
	Some(match word {
		"int" => TokenKind::IntType,
		"double" => TokenKind::DoubleType,
		"string" => TokenKind::StringType,
		"bool" => TokenKind::BoolType,
		"void" => TokenKind::Void,

		"func" => TokenKind::Func,
		"if" => TokenKind::If,
		"else" => TokenKind::Else,
		"while" => TokenKind::While,
		"for" => TokenKind::For,
		"break" => TokenKind::Break,
		"continue" => TokenKind::Continue,
		"return" => TokenKind::Return,
		"print" => TokenKind::Print,

		"true" => TokenKind::True,
		"false" => TokenKind::False,

		_ => return None
	})
}

/// Output of a full lexing pass.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
	pub tokens: Vec<Token>,
	pub errors: Vec<LexicalError>,
}

#[derive(Debug)]
pub struct Lexer<T: Iterator<Item = (u32, char)>> {
	position: u32,
	next_position: u32,
	ch: Option<char>,
	next_ch: Option<char>,
	input: T,

	line: u32,
	column: u32,
	finished: bool,
	errors: Vec<LexicalError>,
}

impl<T: Iterator<Item = (u32, char)>> Display for Lexer<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f,
			"Lexer {{\n\tposition: {},\n\tline: {}, column: {},\n\tch: {:?}, next_ch: {:?}\n}}",
			self.position, self.line, self.column, self.ch, self.next_ch
		)
	}
}

impl<T: Iterator<Item = (u32, char)>> Lexer<T> {
	pub fn new(input: T) -> Self {
		let mut lexer = Self {
			position: 0,
			next_position: 0,
			ch: None,
			next_ch: None,
			input,

			line: 1,
			column: 1,
			finished: false,
			errors: vec![],
		};

		lexer.next_char();
		lexer.next_char();

		lexer
	}

	pub fn errors(&self) -> &[LexicalError] {
		&self.errors
	}

	pub fn take_errors(&mut self) -> Vec<LexicalError> {
		std::mem::take(&mut self.errors)
	}

	pub fn next_token(&mut self) -> Token {
		self.skip_trivia();

		let start = (self.line, self.column, self.position);

		match self.ch {
			Some(ch) if ch.is_ascii_digit() => self.lex_number(start),
			Some(ch) if ch.is_alphabetic() || ch == '_' => self.lex_ident(start),
			Some('"') => self.lex_string(start),
			Some(ch) => self.lex_operator(ch, start),
			None => {
				self.finished = true;
				self.token(TokenKind::Eof, String::new(), None, start)
			}
		}
	}

	fn next_char(&mut self) -> Option<char> {
		let ch = self.ch;

		match ch {
			Some('\n') => {
				self.line += 1;
				self.column = 1;
			},
			Some(_) => self.column += 1,
			None => {}
		}

		let next = self.input.next();

		self.ch = self.next_ch;
		self.position = self.next_position;

		match next {
			Some((pos, next_ch)) => {
				self.next_ch = Some(next_ch);
				self.next_position = pos;
			},
			None => {
				self.next_ch = None;
				self.next_position = self.position + self.ch.map_or(0, |c| c.len_utf8() as u32);
			}
		}

		ch
	}

	fn skip_trivia(&mut self) {
		loop {
			match (self.ch, self.next_ch) {
				(Some(ch), _) if ch.is_whitespace() => {
					self.next_char();
				},
				(Some('/'), Some('/')) => {
					while !matches!(self.ch, Some('\n') | None) {
						self.next_char();
					}
				},
				_ => break
			}
		}
	}

	fn token(
		&self,
		kind: TokenKind,
		lexeme: String,
		value: Option<TokenValue>,
		(line, column, offset): (u32, u32, u32)
	) -> Token {
		Token { kind, lexeme, value, line, column, offset }
	}

	fn error(&mut self, error: LexicalErrorType, (line, column, offset): (u32, u32, u32)) {
		let end = self.position.max(offset + 1);

		self.errors.push(LexicalError {
			error,
			location: Location::new(line, column, SrcSpan::from(offset, end))
		});
	}

	fn eat_chars(&mut self, kind: TokenKind, count: usize, start: (u32, u32, u32)) -> Token {
		let mut lexeme = String::with_capacity(count);

		for _ in 0..count {
			if let Some(ch) = self.next_char() {
				lexeme.push(ch);
			}
		}

		self.token(kind, lexeme, None, start)
	}

	fn eat_while(&mut self, lexeme: &mut String, predicate: impl Fn(char) -> bool) {
		while let Some(ch) = self.ch {
			if !predicate(ch) {
				break;
			}

			lexeme.push(ch);
			self.next_char();
		}
	}

	fn lex_ident(&mut self, start: (u32, u32, u32)) -> Token {
		let mut ident = String::new();

		self.eat_while(&mut ident, |ch| ch.is_alphanumeric() || ch == '_');

		match str_to_keyword(&ident) {
			Some(kind) => self.token(kind, ident, None, start),
			None => self.token(TokenKind::Ident, ident, None, start)
		}
	}

	fn lex_number(&mut self, start: (u32, u32, u32)) -> Token {
		let mut value = String::new();

		self.eat_while(&mut value, |ch| ch.is_ascii_digit());

		// `1.` and `1.foo` leave the period for the next token
		let is_double = matches!(
			(self.ch, self.next_ch),
			(Some('.'), Some(next)) if next.is_ascii_digit()
		);

		if is_double {
			value.push('.');
			self.next_char();
			self.eat_while(&mut value, |ch| ch.is_ascii_digit());
		}

		if matches!(self.ch, Some(ch) if ch.is_alphabetic() || ch == '_') {
			self.eat_while(&mut value, |ch| ch.is_alphanumeric() || ch == '_');
			self.error(LexicalErrorType::InvalidIdentifier { lexeme: value.clone() }, start);

			return self.token(TokenKind::Invalid, value, None, start);
		}

		if is_double {
			return match value.parse::<f64>() {
				Ok(parsed) => self.token(TokenKind::Double, value, Some(TokenValue::Double(parsed)), start),
				Err(_) => {
					self.error(LexicalErrorType::MalformedNumber { lexeme: value.clone() }, start);
					self.token(TokenKind::Invalid, value, None, start)
				}
			};
		}

		match value.parse::<i64>() {
			Ok(parsed) => self.token(TokenKind::Int, value, Some(TokenValue::Int(parsed)), start),
			Err(_) => {
				self.error(LexicalErrorType::MalformedNumber { lexeme: value.clone() }, start);
				self.token(TokenKind::Invalid, value, None, start)
			}
		}
	}

	fn lex_string(&mut self, start: (u32, u32, u32)) -> Token {
		let mut lexeme = String::from("\"");
		let mut content = String::new();

		self.next_char(); // skip opening quote

		loop {
			match self.ch {
				Some('"') => {
					self.next_char();
					lexeme.push('"');

					return self.token(TokenKind::String, lexeme, Some(TokenValue::String(content)), start);
				},
				Some('\n') | None => {
					self.error(LexicalErrorType::UnterminatedString, start);

					return self.token(TokenKind::Invalid, lexeme, None, start);
				},
				Some(ch) => {
					lexeme.push(ch);
					content.push(ch);
					self.next_char();
				}
			}
		}
	}

	fn lex_operator(&mut self, ch: char, start: (u32, u32, u32)) -> Token {
		let double = match (ch, self.next_ch) {
			('<', Some('=')) => Some(TokenKind::LessThanOrEqual),
			('>', Some('=')) => Some(TokenKind::GreaterThanOrEqual),
			('=', Some('=')) => Some(TokenKind::Equal),
			('!', Some('=')) => Some(TokenKind::NotEqual),
			('&', Some('&')) => Some(TokenKind::And),
			('|', Some('|')) => Some(TokenKind::Or),
			('+', Some('+')) => Some(TokenKind::Increment),
			('-', Some('-')) => Some(TokenKind::Decrement),
			('+', Some('=')) => Some(TokenKind::PlusAssign),
			('-', Some('=')) => Some(TokenKind::MinusAssign),
			('*', Some('=')) => Some(TokenKind::StarAssign),
			('/', Some('=')) => Some(TokenKind::SlashAssign),
			('%', Some('=')) => Some(TokenKind::PercentAssign),
			_ => None
		};

		if let Some(kind) = double {
			return self.eat_chars(kind, 2, start);
		}

		let single = match ch {
			'+' => TokenKind::Plus,
			'-' => TokenKind::Minus,
			'*' => TokenKind::Star,
			'/' => TokenKind::Slash,
			'%' => TokenKind::Percent,
			'=' => TokenKind::Assign,
			'<' => TokenKind::LessThan,
			'>' => TokenKind::GreaterThan,
			'!' => TokenKind::Bang,
			'(' => TokenKind::LParen,
			')' => TokenKind::RParen,
			'{' => TokenKind::LBrace,
			'}' => TokenKind::RBrace,
			'[' => TokenKind::LBracket,
			']' => TokenKind::RBracket,
			',' => TokenKind::Comma,
			';' => TokenKind::Semicolon,
			_ => {
				let token = self.eat_chars(TokenKind::Invalid, 1, start);
				self.error(LexicalErrorType::InvalidCharacter { ch }, start);

				return token;
			}
		};

		self.eat_chars(single, 1, start)
	}
}

impl<T: Iterator<Item = (u32, char)>> Iterator for Lexer<T> {
	type Item = Token;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		Some(self.next_token())
	}
}

pub fn tokenize(src: &str) -> Lexed {
	let lexer = Lexer::new(src.char_indices().map(|(i, c)| (i as u32, c)));

	collect(lexer)
}

pub fn tokenize_stream(stream: impl Iterator<Item = char>) -> Lexed {
	let lexer = Lexer::new(stream
		.scan(0, |pos, c| {
			*pos += c.len_utf8() as u32;
			Some((*pos - c.len_utf8() as u32, c))
		})
	);

	collect(lexer)
}

fn collect<T: Iterator<Item = (u32, char)>>(mut lexer: Lexer<T>) -> Lexed {
	let tokens = lexer.by_ref().collect::<Vec<Token>>();
	let errors = lexer.take_errors();

	log::debug!("lexed {} tokens with {} errors", tokens.len(), errors.len());

	Lexed { tokens, errors }
}
