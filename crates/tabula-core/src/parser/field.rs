//! Field-level state machine
//!
//! Parses exactly one field starting at the cursor. Quoted and unquoted
//! fields are scanned with explicit loops so that long runs of escapes or
//! embedded newlines never grow the stack.

use crate::error::{Error, ParseErrorKind, Result};
use crate::settings::{is_newline, RecordTerminator, Settings, TrimMode};
use crate::source::CharSource;

/// What stopped a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEnd {
    /// A field separator; more fields follow in the same record
    Separator,
    /// `\r`
    Cr,
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// End of input
    Eof,
}

impl FieldEnd {
    /// The record terminator this end marker represents, if any
    pub fn terminator(self) -> Option<RecordTerminator> {
        match self {
            FieldEnd::Cr => Some(RecordTerminator::Cr),
            FieldEnd::Lf => Some(RecordTerminator::Lf),
            FieldEnd::CrLf => Some(RecordTerminator::CrLf),
            FieldEnd::Separator | FieldEnd::Eof => None,
        }
    }
}

/// Result of parsing one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
    /// Field value, `None` when it matched the null value
    pub value: Option<String>,
    /// Characters consumed, including the end marker
    pub len: usize,
    /// Whether the field was quoted
    pub quoted: bool,
    /// What ended the field
    pub end: FieldEnd,
    /// Line after the field (1-based)
    pub line: usize,
    /// Position within that line after the field (1-based)
    pub column: usize,
}

/// Running counters while scanning a field
struct Scan {
    line: usize,
    column: usize,
    len: usize,
}

impl Scan {
    #[inline]
    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }
}

/// Parses a single field
#[derive(Debug, Clone)]
pub struct FieldParser {
    separator: char,
    quote: Option<char>,
    escape: Option<char>,
    terminator: Option<RecordTerminator>,
    trim_mode: TrimMode,
    null_value: Option<String>,
    // Reused between fields
    buf: String,
}

impl FieldParser {
    /// Create a field parser from validated settings
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            separator: settings.separator,
            quote: settings.quote,
            escape: settings.escape,
            terminator: settings.record_terminator,
            trim_mode: settings.trim_mode,
            null_value: settings.null_value.clone(),
            buf: String::new(),
        })
    }

    /// Parse the field starting at the cursor.
    ///
    /// `line` and `column` are the 1-based position of the cursor; the
    /// returned field carries the position after it.
    pub fn parse<S: CharSource + ?Sized>(
        &mut self,
        source: &mut S,
        line: usize,
        column: usize,
    ) -> Result<ParsedField> {
        debug_assert!(line >= 1 && column >= 1, "positions are 1-based");

        self.buf.clear();
        let mut scan = Scan { line, column, len: 0 };

        let first = match source.peek()? {
            Some(c) => c,
            None => {
                return Ok(ParsedField {
                    value: self.take_value(false),
                    len: 0,
                    quoted: false,
                    end: FieldEnd::Eof,
                    line,
                    column,
                });
            }
        };

        let quoted = Some(first) == self.quote;
        let end = if quoted {
            source.next_char()?;
            scan.len += 1;
            scan.column += 1;

            if !self.scan_quoted(source, &mut scan)? {
                // Report the opening quote, not the end of input
                return Err(Error::parse(ParseErrorKind::UnterminatedQuote, line, column));
            }
            self.scan_after_quote(source, &mut scan)?
        } else {
            self.scan_unquoted(source, &mut scan)?
        };

        Ok(ParsedField {
            value: self.take_value(quoted),
            len: scan.len,
            quoted,
            end,
            line: scan.line,
            column: scan.column,
        })
    }

    /// Scan the body of a quoted field up to and including the closing quote.
    /// Returns `false` if input ended first.
    fn scan_quoted<S: CharSource + ?Sized>(
        &mut self,
        source: &mut S,
        scan: &mut Scan,
    ) -> Result<bool> {
        loop {
            let c = match source.next_char()? {
                Some(c) => c,
                None => return Ok(false),
            };
            scan.len += 1;

            // Escape is checked before quote so that escape == quote works
            if Some(c) == self.escape {
                if let Some(next) = source.peek()? {
                    if Some(next) == self.quote || Some(next) == self.escape {
                        source.next_char()?;
                        scan.len += 1;
                        scan.column += 2;
                        self.buf.push(next);
                        continue;
                    }
                }
            }

            if Some(c) == self.quote {
                scan.column += 1;
                return Ok(true);
            }

            self.buf.push(c);
            if is_newline(c) {
                scan.new_line();
                if c == '\r' && source.peek()? == Some('\n') {
                    source.next_char()?;
                    scan.len += 1;
                    self.buf.push('\n');
                }
            } else {
                scan.column += 1;
            }
        }
    }

    /// After a closing quote only a separator, a newline or end of input may follow
    fn scan_after_quote<S: CharSource + ?Sized>(
        &mut self,
        source: &mut S,
        scan: &mut Scan,
    ) -> Result<FieldEnd> {
        let c = match source.next_char()? {
            Some(c) => c,
            None => return Ok(FieldEnd::Eof),
        };

        if c == self.separator {
            scan.len += 1;
            scan.column += 1;
            return Ok(FieldEnd::Separator);
        }

        match c {
            '\r' => {
                scan.len += 1;
                if source.peek()? == Some('\n') {
                    source.next_char()?;
                    scan.len += 1;
                    Ok(FieldEnd::CrLf)
                } else {
                    Ok(FieldEnd::Cr)
                }
            }
            '\n' => {
                scan.len += 1;
                Ok(FieldEnd::Lf)
            }
            _ => Err(Error::parse(
                ParseErrorKind::InvalidCharacterAfterQuote,
                scan.line,
                scan.column,
            )),
        }
    }

    fn scan_unquoted<S: CharSource + ?Sized>(
        &mut self,
        source: &mut S,
        scan: &mut Scan,
    ) -> Result<FieldEnd> {
        loop {
            let c = match source.next_char()? {
                Some(c) => c,
                None => return Ok(FieldEnd::Eof),
            };
            scan.len += 1;

            if !self.is_special_unquoted(c) {
                self.buf.push(c);
                scan.column += 1;
                continue;
            }

            let next = source.peek()?;

            if self.is_end_of_field(c, next) {
                if c == self.separator {
                    scan.column += 1;
                    return Ok(FieldEnd::Separator);
                }
                if c == '\r' {
                    if next == Some('\n') {
                        source.next_char()?;
                        scan.len += 1;
                        return Ok(FieldEnd::CrLf);
                    }
                    return Ok(FieldEnd::Cr);
                }
                return Ok(FieldEnd::Lf);
            }

            let mut ch = c;
            if Some(c) == self.escape {
                match next {
                    None => {
                        return Err(Error::parse(
                            ParseErrorKind::InvalidEscapePosition,
                            scan.line,
                            scan.column,
                        ));
                    }
                    Some(n) if is_newline(n) => {
                        source.next_char()?;
                        scan.len += 1;
                        ch = n;
                    }
                    Some(n)
                        if n == self.separator
                            || Some(n) == self.escape
                            || Some(n) == self.quote =>
                    {
                        source.next_char()?;
                        scan.len += 1;
                        scan.column += 1;
                        ch = n;
                    }
                    // Escape before an ordinary character is kept as data
                    Some(_) => {}
                }
            }

            let prev = self.buf.chars().next_back();
            self.buf.push(ch);

            if ch == '\r' || (ch == '\n' && prev != Some('\r')) {
                scan.new_line();
            } else if ch != '\n' {
                scan.column += 1;
            }
        }
    }

    #[inline]
    fn is_special_unquoted(&self, c: char) -> bool {
        c == self.separator || is_newline(c) || Some(c) == self.escape
    }

    fn is_end_of_field(&self, c: char, next: Option<char>) -> bool {
        if c == self.separator {
            return true;
        }

        match self.terminator {
            Some(RecordTerminator::Cr) => c == '\r',
            Some(RecordTerminator::Lf) => c == '\n',
            Some(RecordTerminator::CrLf) => c == '\r' && next == Some('\n'),
            None => is_newline(c),
        }
    }

    /// Apply trimming and null substitution to the buffered value
    fn take_value(&self, quoted: bool) -> Option<String> {
        let mut value = self.buf.as_str();

        if !quoted {
            if self.trim_mode.contains(TrimMode::LEFT) {
                value = value.trim_start();
            }
            if self.trim_mode.contains(TrimMode::RIGHT) {
                value = value.trim_end();
            }
        }

        if self.null_value.as_deref() == Some(value) {
            None
        } else {
            Some(value.to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;
    use pretty_assertions::assert_eq;

    fn parser(settings: Settings) -> FieldParser {
        FieldParser::new(&settings).unwrap()
    }

    fn crlf() -> Settings {
        Settings::strict()
    }

    fn parse_at(settings: Settings, text: &str, line: usize, column: usize) -> Result<ParsedField> {
        let mut source = StrSource::new(text);
        parser(settings).parse(&mut source, line, column)
    }

    fn parse(settings: Settings, text: &str) -> Result<ParsedField> {
        parse_at(settings, text, 1, 1)
    }

    fn value(settings: Settings, text: &str) -> Option<String> {
        parse(settings, text).unwrap().value
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings::default().with_separator('\n');
        assert!(FieldParser::new(&settings).is_err());
    }

    #[test]
    fn test_length_to_next_field() {
        let cases = [
            (",PSG1", ',', 1),
            ("Heckler & Koch\tPSG1", '\t', 15),
            ("\"\",\".338 Lapua Magnum\"", ',', 3),
            ("\"Noreen \"\"Bad News\"\" ULR 338\"\t\".338 Lapua Magnum\"", '\t', 30),
            ("\"Gas-operated,Rotating bolt\",\"Semi-automatic\"", ',', 29),
        ];
        for (text, separator, expected) in cases {
            let field = parse(crlf().with_separator(separator), text).unwrap();
            assert_eq!(field.len, expected, "{text:?}");
            assert_eq!(field.end, FieldEnd::Separator);
        }
    }

    #[test]
    fn test_length_to_next_record() {
        let cases = [
            ("\r\nPSG1\r\n", RecordTerminator::CrLf, 2),
            ("\nPSG1\n", RecordTerminator::Lf, 1),
            ("WA 2000\r\nPSG1\r\n", RecordTerminator::CrLf, 9),
            ("WA 2000\nPSG1\n", RecordTerminator::Lf, 8),
            ("\"\"\r\n\"NTW-20\"\r\n", RecordTerminator::CrLf, 4),
            (
                "\"Noreen \"\"Bad News\"\" ULR 338\"\r\n\"NTW-20\"\r\n",
                RecordTerminator::CrLf,
                31,
            ),
            (
                "\"7.62mmx51mm NATO\r\n.300Winchester Magnum\r\n7.5x55mm Swiss\"\r\n\"9x19mm Parabellum\"\r\n",
                RecordTerminator::CrLf,
                59,
            ),
        ];
        for (text, terminator, expected) in cases {
            let settings = Settings::default().with_record_terminator(Some(terminator));
            let field = parse(settings, text).unwrap();
            assert_eq!(field.len, expected, "{text:?}");
            assert_eq!(field.end.terminator(), Some(terminator));
        }
    }

    #[test]
    fn test_length_to_eof() {
        for (text, expected) in [("", 0), ("WA 2000", 7), ("\"\"", 2), ("\"WA 2000\"", 9)] {
            let field = parse(Settings::default(), text).unwrap();
            assert_eq!(field.len, expected, "{text:?}");
            assert_eq!(field.end, FieldEnd::Eof);
        }
    }

    #[test]
    fn test_unquoted_value_as_is() {
        assert_eq!(value(Settings::default(), ""), Some(String::new()));
        assert_eq!(
            value(Settings::default(), "Heckler & Koch,PSG1"),
            Some("Heckler & Koch".into())
        );
    }

    #[test]
    fn test_unquoted_quote_is_data() {
        let settings = Settings::default().with_escape(None);
        assert_eq!(value(settings, "12\" barrel,x"), Some("12\" barrel".into()));
    }

    #[test]
    fn test_unquoted_escaped_separator() {
        let settings = crlf().with_escape(Some('\\'));
        assert_eq!(
            value(settings, "Gas-operated\\,Rotating bolt,Semi-automatic"),
            Some("Gas-operated,Rotating bolt".into())
        );

        let settings = crlf().with_separator('\t').with_escape(Some('$'));
        assert_eq!(
            value(settings, "Gas-operated$\tRotating bolt\tSemi-automatic"),
            Some("Gas-operated\tRotating bolt".into())
        );
    }

    #[test]
    fn test_unquoted_escaped_quote() {
        let settings = Settings::default().with_escape(Some('\\'));
        assert_eq!(value(settings, "12\\\" barrel"), Some("12\" barrel".into()));
    }

    #[test]
    fn test_unquoted_escaped_newlines() {
        let cases = [
            ("\\\r\n", RecordTerminator::Cr, "\r\n"),
            ("\\\r\n", RecordTerminator::CrLf, "\r\n"),
            ("\r\\\n", RecordTerminator::Lf, "\r\n"),
            (
                "7.62mmx51mm NATO\\\r\n.300Winchester Magnum\\\r\n7.5x55mm Swiss\r\n9x19mm Parabellum\r\n",
                RecordTerminator::CrLf,
                "7.62mmx51mm NATO\r\n.300Winchester Magnum\r\n7.5x55mm Swiss",
            ),
        ];
        for (text, terminator, expected) in cases {
            let settings = Settings::default()
                .with_escape(Some('\\'))
                .with_record_terminator(Some(terminator));
            assert_eq!(value(settings, text), Some(expected.to_string()), "{text:?}");
        }

        let settings = Settings::default()
            .with_escape(Some('/'))
            .with_record_terminator(Some(RecordTerminator::Lf));
        assert_eq!(
            value(
                settings,
                "7.62mmx51mm NATO/\n.300Winchester Magnum/\n7.5x55mm Swiss\n9x19mm Parabellum\n"
            ),
            Some("7.62mmx51mm NATO\n.300Winchester Magnum\n7.5x55mm Swiss".into())
        );
    }

    #[test]
    fn test_unquoted_ends_with_escape() {
        let err = parse(crlf(), "Noreen \"\"Bad News\"\" ULR 338\"").unwrap_err();
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::InvalidEscapePosition));
        assert_eq!(err.location(), Some((1, 28)));

        let settings = crlf().with_escape(Some('\\'));
        let err = parse(
            settings,
            "7.62mmx51mm NATO\\\r\n.300Winchester Magnum\\\r\n7.5x55mm Swiss\\",
        )
        .unwrap_err();
        assert_eq!(err.location(), Some((3, 15)));
    }

    #[test]
    fn test_quoted_value_without_quotes() {
        assert_eq!(value(Settings::default(), "\"\""), Some(String::new()));
        assert_eq!(
            value(Settings::default(), "\"Heckler & Koch\",PSG1"),
            Some("Heckler & Koch".into())
        );

        let single = Settings::default()
            .with_quote(Some('\''))
            .with_escape(Some('\''));
        assert_eq!(value(single.clone(), "''"), Some(String::new()));
        assert_eq!(value(single, "'Heckler & Koch',PSG1"), Some("Heckler & Koch".into()));
    }

    #[test]
    fn test_quoted_escaped_quote() {
        assert_eq!(
            value(Settings::default(), "\"Noreen \"\"Bad News\"\" ULR 338\""),
            Some("Noreen \"Bad News\" ULR 338".into())
        );

        let settings = Settings::default()
            .with_quote(Some('\''))
            .with_escape(Some('\\'));
        assert_eq!(
            value(settings, "'Noreen \\'Bad News\\' ULR 338'"),
            Some("Noreen 'Bad News' ULR 338".into())
        );
    }

    #[test]
    fn test_quoted_distinct_escape_before_ordinary_char() {
        let settings = Settings::default().with_escape(Some('\\'));
        assert_eq!(value(settings.clone(), "\"C:\\temp\""), Some("C:\\temp".into()));
        assert_eq!(value(settings, "\"a\\\\b\""), Some("a\\b".into()));
    }

    #[test]
    fn test_quoted_not_closed() {
        for quote in ['"', '\''] {
            let settings = Settings::default()
                .with_quote(Some(quote))
                .with_escape(Some(quote));
            let text = format!("{quote}Noreen {quote}{quote}Bad News{quote}{quote} ULR 338");
            let err = parse_at(settings, &text, 4, 9).unwrap_err();
            assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnterminatedQuote));
            assert_eq!(err.location(), Some((4, 9)));
        }
    }

    #[test]
    fn test_quoted_followed_by_invalid_character() {
        let err = parse(Settings::default(), "\"Heckler & Koch\" ,PSG1").unwrap_err();
        assert_eq!(
            err.parse_kind(),
            Some(ParseErrorKind::InvalidCharacterAfterQuote)
        );
        assert_eq!(err.location(), Some((1, 17)));
    }

    #[test]
    fn test_line_number_relative_to_start() {
        let settings = crlf().with_escape(Some('\\'));
        let field = parse_at(
            settings,
            "7.62mmx51mm NATO\\\r.300Winchester Magnum\\\r7.5x55mm Swiss",
            346,
            1,
        )
        .unwrap();
        assert_eq!(field.line, 348);

        let field = parse_at(
            crlf(),
            "\"7.62mmx51mm NATO\r\n.300Winchester Magnum\r\n7.5x55mm Swiss\"",
            765,
            1,
        )
        .unwrap();
        assert_eq!(field.line, 767);
    }

    #[test]
    fn test_error_line_relative_to_start() {
        let text = "7.62mmx51mm NATO\"\r\n.300Winchester Magnum\"\r\n7.5x55mm Swiss\"";
        let err = parse_at(crlf(), text, 765, 1).unwrap_err();
        assert_eq!(err.location().map(|(line, _)| line), Some(767));
    }

    #[test]
    fn test_position_relative_to_start() {
        let field = parse_at(crlf(), "Heckler & Koch", 1, 346).unwrap();
        assert_eq!(field.column, 360);

        let field = parse_at(crlf(), "\"Accuracy International\"", 1, 765).unwrap();
        assert_eq!(field.column, 789);
    }

    #[test]
    fn test_multiline_position_resets() {
        let settings = crlf().with_escape(Some('\\'));
        let field = parse_at(
            settings,
            "7.62mmx51mm NATO\n.300Winchester Magnum\n7.5x55mm Swiss",
            1,
            765,
        )
        .unwrap();
        assert_eq!(field.column, 15);

        let field = parse_at(
            crlf(),
            "\"7.62mmx51mm NATO\r\n.300Winchester Magnum\r\n7.5x55mm Swiss\"",
            1,
            765,
        )
        .unwrap();
        assert_eq!(field.column, 16);
    }

    #[test]
    fn test_error_position_relative_to_start() {
        let err = parse_at(crlf(), "9x19mm Parabellum\"", 1, 765).unwrap_err();
        assert_eq!(err.location(), Some((1, 782)));
    }

    #[test]
    fn test_trim_modes() {
        let cases = [
            (TrimMode::LEFT, "Heckler & Koch "),
            (TrimMode::RIGHT, " Heckler & Koch"),
            (TrimMode::BOTH, "Heckler & Koch"),
            (TrimMode::NONE, " Heckler & Koch "),
        ];
        for (mode, expected) in cases {
            let settings = crlf().with_trim_mode(mode);
            assert_eq!(value(settings, " Heckler & Koch "), Some(expected.into()));
        }
    }

    #[test]
    fn test_quoted_never_trimmed() {
        let settings = crlf().with_trim_mode(TrimMode::BOTH);
        let field = parse(settings, "\" Heckler & Koch \",PSG1").unwrap();
        assert!(field.quoted);
        assert_eq!(field.value, Some(" Heckler & Koch ".into()));
    }

    #[test]
    fn test_null_value_matches() {
        let cases = [("", '"'), ("\\N", '\\'), ("NULL", '"')];
        for (text, escape) in cases {
            let settings = crlf().with_escape(Some(escape)).with_null_value(text);
            assert_eq!(value(settings, text), None, "{text:?}");
        }
    }

    #[test]
    fn test_null_value_compared_after_trim() {
        let settings = Settings::default()
            .with_trim_mode(TrimMode::BOTH)
            .with_null_value("NULL");
        assert_eq!(value(settings.clone(), "  NULL ,x"), None);
        assert_eq!(value(settings, "\"NULL \""), Some("NULL ".into()));
    }

    #[test]
    fn test_auto_terminator_ends_at_any_newline() {
        let field = parse(Settings::default(), "A\rB").unwrap();
        assert_eq!(field.value, Some("A".into()));
        assert_eq!(field.end, FieldEnd::Cr);

        let field = parse(Settings::default(), "A\r\nB").unwrap();
        assert_eq!(field.end, FieldEnd::CrLf);
        assert_eq!(field.len, 3);
    }

    #[test]
    fn test_forced_terminator_keeps_other_newlines() {
        let settings = Settings::default().with_record_terminator(Some(RecordTerminator::Lf));
        let field = parse(settings, "A\rB\nC").unwrap();
        assert_eq!(field.value, Some("A\rB".into()));
        assert_eq!(field.end, FieldEnd::Lf);
        assert_eq!(field.line, 2);
    }

    #[test]
    fn test_many_escapes_do_not_recurse() {
        let body = "\"\"".repeat(100_000);
        let text = format!("\"{body}\"");
        let field = parse(Settings::default(), &text).unwrap();
        assert_eq!(field.value.map(|v| v.len()), Some(100_000));
    }
}
