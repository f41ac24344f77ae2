use lasso::Resolver;

use crate::{
	common::Range,
	driver::RunError,
	frontend::{
		elaborate::{Diagnostic, Severity},
		lex::{LexError, LexErrorKind},
	},
};

pub fn report_diagnostic(source: &str, diagnostic: &Diagnostic, resolver: &impl Resolver) {
	let severity = match diagnostic.severity {
		Severity::Error => "error",
		Severity::Warning => "warning",
	};
	report_line(source, diagnostic.range, severity, &diagnostic.message(resolver))
}

pub fn report_run_error(source: &str, error: &RunError) {
	match error {
		RunError::Lex(lex_error) => {
			let LexError(location, _) = lex_error;
			report_line(source, (*location, location + 1), "error", &format_lex_error(source, lex_error))
		}
		RunError::Parse { range, expected } =>
			report_line(source, *range, "error", &format!("parse error: expected one of: {expected:?}")),
		error => eprintln!("error: {error}"),
	}
}

fn report_line(source: &str, range: Range, severity: &str, message: &str) {
	const TAB_REPLACEMENT: &str = "   ";

	let mut lines = source.split_inclusive('\n');
	let mut line_number: usize = 0;
	let mut bytes_left = range.0;
	let (line, bytes_left, width) = loop {
		if let Some(line) = lines.next() {
			line_number += 1;
			if line.len() <= bytes_left {
				bytes_left -= line.len();
			} else {
				let width = range.1.min(range.0 - bytes_left + line.trim_end().len()).saturating_sub(range.0);
				break (line, bytes_left, width.max(1));
			}
		} else {
			// Past the end: point just after the last line.
			let last = source.rsplit('\n').next().unwrap_or_default();
			line_number = source.split('\n').count();
			break (last, last.len(), 1);
		}
	};

	eprint!("[{}:{}] ", line_number, bytes_left);
	eprintln!("{severity}: {message}");

	let visual_line = line.replace('\t', TAB_REPLACEMENT).trim_end().to_owned();
	let visual_offset: usize =
		unicode_width::UnicodeWidthStr::width(line[0..bytes_left].replace('\t', TAB_REPLACEMENT).as_str());

	let displayed_line_number = line_number.to_string();
	let dummy_line_number = " ".repeat(displayed_line_number.len());
	eprintln!("{} |", dummy_line_number);
	eprintln!("{} | {}", displayed_line_number, visual_line);
	eprintln!("{} | {}{}", dummy_line_number, " ".repeat(visual_offset), "^".repeat(width));
}

fn format_lex_error(source: &str, LexError(location, kind): &LexError) -> String {
	fn char_list_string(chars: &[char]) -> String {
		chars.iter().map(|c| format!("`{}`", c.escape_default())).collect::<Vec<_>>().join(", ")
	}

	let found = source.get(*location..).and_then(|rest| rest.chars().next());
	match (kind, found) {
		(LexErrorKind::UnrecognizedLexemePrefix, Some(c)) => format!("lex error: unrecognized lexeme prefix `{c}`"),
		(LexErrorKind::UnexpectedCharacter(expected), Some(c)) =>
			format!("lex error: expected one of {}; found `{}`", char_list_string(expected), c.escape_default()),
		(_, None) | (LexErrorKind::UnexpectedEnd(_), _) => {
			let expected = match kind {
				LexErrorKind::UnexpectedCharacter(expected) | LexErrorKind::UnexpectedEnd(expected) => *expected,
				LexErrorKind::UnrecognizedLexemePrefix => &[],
			};
			format!("lex error: expected one of {}; found end of input", char_list_string(expected))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::frontend::lex::lex;

	#[test]
	fn lex_errors_name_what_was_expected() {
		let source = "\"abc";
		let error = lex(source).err().expect("source should not lex");
		assert_eq!(format_lex_error(source, &error), "lex error: expected one of `\\\"`; found end of input");
	}

	#[test]
	fn unrecognized_prefixes_are_quoted() {
		let source = "1 # 2";
		let error = lex(source).err().expect("source should not lex");
		assert_eq!(format_lex_error(source, &error), "lex error: unrecognized lexeme prefix `#`");
	}
}
