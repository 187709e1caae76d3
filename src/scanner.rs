//! Lexical scanner for named bind parameters.
//!
//! Rewrites every `:name` token outside of string constants, quoted
//! identifiers, comments and dollar-quoted literals into the marker of a
//! [`BindStyle`]. Everything else is copied through untouched.
//!
//! ```text
//! SELECT * FROM users WHERE id = :id AND note <> ':id' -- :id
//!                                ─┬─            ──┬──    ─┬─
//!                                 │               │       └── comment, copied
//!                                 │               └── string constant, copied
//!                                 └── parameter, rewritten to $1
//! ```
//!
//! The scan is a single pass over the characters of the query. A decision
//! only ever looks at the current character, the one before it and the one
//! after it; nothing is re-read.

use std::iter::Peekable;
use std::str::Chars;

use serde::Serialize;
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::bind::BindStyle;
use crate::params::ParamTable;

/// A lexical region the input ended inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    QuotedIdentifier,
    StringConstant,
    BlockComment,
    DollarQuoteLiteral,
}

impl Region {
    pub fn describe(self) -> &'static str {
        match self {
            Region::QuotedIdentifier => "quoted identifier",
            Region::StringConstant => "string constant",
            Region::BlockComment => "block comment",
            Region::DollarQuoteLiteral => "dollar-quoted literal",
        }
    }
}

/// Result of scanning one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewritten {
    /// The query with every parameter replaced by its marker.
    pub sql: String,
    /// Parameter names in marker order.
    pub params: Vec<String>,
    /// Set when the input ended inside an unterminated region. The output is
    /// still complete; the region is copied through as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unterminated: Option<Region>,
}

#[derive(Debug)]
enum State {
    Query,
    ConsumingIdentifier(String),
    QuotedIdentifier,
    StringConstant,
    LineComment,
    BlockComment {
        depth: usize,
    },
    /// Saw `$`, collecting a possible `$tag$` opener.
    DollarTag(String),
    DollarQuoteLiteral {
        tag: String,
        /// Bytes of `tag` matched since the last `$`.
        closing: Option<usize>,
    },
}

/// Scan `query` and rewrite its named parameters into `style` markers.
///
/// With `combine_duplicates`, repeated names share one index (`$1 ... $1`)
/// and appear once in [`Rewritten::params`]. A `Question` marker has no index
/// to share, so that style always lists every occurrence.
///
/// # Example
///
/// ```
/// use sqlgen::{scan, BindStyle};
///
/// let out = scan("SELECT * FROM foo WHERE id = :id OR id > :id", BindStyle::Dollar, true);
/// assert_eq!(out.sql, "SELECT * FROM foo WHERE id = $1 OR id > $1");
/// assert_eq!(out.params, vec!["id"]);
/// ```
pub fn scan(query: &str, style: BindStyle, combine_duplicates: bool) -> Rewritten {
    Scanner::new(query, style, combine_duplicates).run()
}

fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

fn is_digit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
}

fn is_ident_start(c: char) -> bool {
    is_letter(c) || c == '_'
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || is_digit(c) || c == '.'
}

// `$` after one of these belongs to an identifier such as `price$usd`.
fn continues_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_tag_part(c: char, first: bool) -> bool {
    c.is_alphabetic() || c == '_' || (!first && c.is_alphanumeric())
}

struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
    previous: Option<char>,
    last: char,
    state: State,
    style: BindStyle,
    params: ParamTable,
    out: String,
}

impl<'a> Scanner<'a> {
    fn new(query: &'a str, style: BindStyle, combine_duplicates: bool) -> Self {
        Self {
            chars: query.chars().peekable(),
            previous: None,
            last: '\0',
            state: State::Query,
            style,
            params: ParamTable::new(style, combine_duplicates),
            out: String::with_capacity(query.len()),
        }
    }

    fn run(mut self) -> Rewritten {
        while let Some(c) = self.chars.next() {
            self.last = c;
            self.step(c);
            self.previous = Some(self.last);
        }
        self.finish()
    }

    fn step(&mut self, c: char) {
        let state = std::mem::replace(&mut self.state, State::Query);
        self.state = match state {
            State::Query => self.query(c),
            State::ConsumingIdentifier(mut ident) => {
                if is_ident_part(c) {
                    ident.push(c);
                    State::ConsumingIdentifier(ident)
                } else {
                    self.add_param(&ident);
                    self.query(c)
                }
            }
            State::QuotedIdentifier => {
                self.out.push(c);
                if c == '"' {
                    State::Query
                } else {
                    State::QuotedIdentifier
                }
            }
            State::StringConstant => {
                self.out.push(c);
                if c == '\'' && self.previous != Some('\\') {
                    State::Query
                } else {
                    State::StringConstant
                }
            }
            State::LineComment => {
                self.out.push(c);
                if c == '\n' {
                    State::Query
                } else {
                    State::LineComment
                }
            }
            State::BlockComment { depth } => {
                self.out.push(c);
                match (c, self.chars.peek().copied()) {
                    ('*', Some('/')) => {
                        self.bump();
                        if depth > 1 {
                            State::BlockComment { depth: depth - 1 }
                        } else {
                            State::Query
                        }
                    }
                    ('/', Some('*')) => {
                        self.bump();
                        State::BlockComment { depth: depth + 1 }
                    }
                    _ => State::BlockComment { depth },
                }
            }
            State::DollarTag(mut tag) => {
                if c == '$' {
                    self.out.push(c);
                    State::DollarQuoteLiteral { tag, closing: None }
                } else if is_tag_part(c, tag.is_empty()) {
                    self.out.push(c);
                    tag.push(c);
                    State::DollarTag(tag)
                } else {
                    self.query(c)
                }
            }
            State::DollarQuoteLiteral { tag, closing } => {
                self.out.push(c);
                match closing {
                    Some(n) if n == tag.len() && c == '$' => State::Query,
                    Some(n) if tag[n..].starts_with(c) => State::DollarQuoteLiteral {
                        closing: Some(n + c.len_utf8()),
                        tag,
                    },
                    _ => State::DollarQuoteLiteral {
                        closing: (c == '$').then_some(0),
                        tag,
                    },
                }
            }
        };
    }

    /// Rules for plain query text; also used to reprocess the character that
    /// ended an identifier or a dollar tag.
    fn query(&mut self, c: char) -> State {
        let next = self.chars.peek().copied();

        if c == ':' && self.previous != Some(':') && next.is_some_and(is_ident_start) {
            return State::ConsumingIdentifier(String::new());
        }

        self.out.push(c);
        match c {
            '\'' if self.previous != Some('\\') => State::StringConstant,
            '-' if next == Some('-') => State::LineComment,
            '/' if next == Some('*') => {
                self.bump();
                State::BlockComment { depth: 1 }
            }
            '$' if !self.previous.is_some_and(continues_word) => State::DollarTag(String::new()),
            '"' => State::QuotedIdentifier,
            _ => State::Query,
        }
    }

    /// Copy the lookahead character as the second half of a two-character token.
    fn bump(&mut self) {
        if let Some(c) = self.chars.next() {
            self.out.push(c);
            self.last = c;
        }
    }

    fn add_param(&mut self, name: &str) {
        let index = self.params.add(name);
        self.style.write_marker(index, name, &mut self.out);
    }

    fn finish(mut self) -> Rewritten {
        let state = std::mem::replace(&mut self.state, State::Query);
        let unterminated = match state {
            State::ConsumingIdentifier(ident) => {
                self.add_param(&ident);
                None
            }
            State::QuotedIdentifier => Some(Region::QuotedIdentifier),
            State::StringConstant => Some(Region::StringConstant),
            State::BlockComment { .. } => Some(Region::BlockComment),
            State::DollarQuoteLiteral { .. } => Some(Region::DollarQuoteLiteral),
            State::Query | State::LineComment | State::DollarTag(_) => None,
        };

        Rewritten {
            sql: self.out,
            params: self.params.into_names(),
            unterminated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollar(query: &str) -> Rewritten {
        scan(query, BindStyle::Dollar, false)
    }

    #[test]
    fn test_no_params() {
        let out = scan("SELECT * FROM users;", BindStyle::Question, false);
        assert_eq!(out.sql, "SELECT * FROM users;");
        assert!(out.params.is_empty());
        assert_eq!(out.unterminated, None);
    }

    #[test]
    fn test_empty_query() {
        let out = dollar("");
        assert_eq!(out.sql, "");
        assert!(out.params.is_empty());
    }

    #[test]
    fn test_param_at_end_of_input() {
        let out = dollar("SELECT x WHERE y = :lastparam");
        assert_eq!(out.sql, "SELECT x WHERE y = $1");
        assert_eq!(out.params, vec!["lastparam"]);
    }

    #[test]
    fn test_only_a_param() {
        let out = dollar(":あ");
        assert_eq!(out.sql, "$1");
        assert_eq!(out.params, vec!["あ"]);
    }

    #[test]
    fn test_dotted_and_numbered_names() {
        let out = scan("WHERE a = :user.id AND b = :b2", BindStyle::Named, false);
        assert_eq!(out.sql, "WHERE a = :user.id AND b = :b2");
        assert_eq!(out.params, vec!["user.id", "b2"]);
    }

    #[test]
    fn test_colon_not_followed_by_identifier() {
        let out = dollar("SELECT a[1:2], b[:3], ':' || x : y");
        assert_eq!(out.sql, "SELECT a[1:2], b[:3], ':' || x : y");
        assert!(out.params.is_empty());
    }

    #[test]
    fn test_type_cast_is_not_a_param() {
        let out = dollar("SELECT :v::text, '1'::numeric");
        assert_eq!(out.sql, "SELECT $1::text, '1'::numeric");
        assert_eq!(out.params, vec!["v"]);
    }

    #[test]
    fn test_terminator_is_reprocessed() {
        // The quote that ends `:a` opens a string constant.
        let out = dollar(":a':b'");
        assert_eq!(out.sql, "$1':b'");
        assert_eq!(out.params, vec!["a"]);

        let out = dollar(":a:b");
        assert_eq!(out.sql, "$1$2");
        assert_eq!(out.params, vec!["a", "b"]);
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let out = dollar(r"SELECT E'user\'s :log' WHERE x = :x");
        assert_eq!(out.sql, r"SELECT E'user\'s :log' WHERE x = $1");
        assert_eq!(out.params, vec!["x"]);
    }

    #[test]
    fn test_doubled_quotes_behave_as_escapes() {
        let out = dollar("SELECT 'Dianne'':not_a_param horse', \"a\"\":b\" FROM t WHERE c = :c");
        assert_eq!(
            out.sql,
            "SELECT 'Dianne'':not_a_param horse', \"a\"\":b\" FROM t WHERE c = $1"
        );
        assert_eq!(out.params, vec!["c"]);
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        let out = dollar("-- :skipped\nSELECT :kept -- :also_skipped");
        assert_eq!(out.sql, "-- :skipped\nSELECT $1 -- :also_skipped");
        assert_eq!(out.params, vec!["kept"]);
    }

    #[test]
    fn test_nested_block_comments() {
        let out = dollar("/* outer /* inner :a */ still comment :b */ :c");
        assert_eq!(out.sql, "/* outer /* inner :a */ still comment :b */ $1");
        assert_eq!(out.params, vec!["c"]);
    }

    #[test]
    fn test_block_comment_opener_is_not_a_closer() {
        let out = dollar("/*/ :a */ :b");
        assert_eq!(out.sql, "/*/ :a */ $1");
        assert_eq!(out.params, vec!["b"]);
    }

    #[test]
    fn test_dollar_quote_untagged() {
        let out = dollar("SELECT $$Dia:not_a_param's horse$$, :x");
        assert_eq!(out.sql, "SELECT $$Dia:not_a_param's horse$$, $1");
        assert_eq!(out.params, vec!["x"]);
        assert_eq!(out.unterminated, None);
    }

    #[test]
    fn test_dollar_quote_tagged_survives_lone_dollar() {
        let q = "CREATE FUNCTION f() RETURNS text AS $fn$ SELECT '$' || :inner; $$ $fn$ LANGUAGE sql; -- :c\nSELECT :outer";
        let out = dollar(q);
        assert_eq!(
            out.sql,
            "CREATE FUNCTION f() RETURNS text AS $fn$ SELECT '$' || :inner; $$ $fn$ LANGUAGE sql; -- :c\nSELECT $1"
        );
        assert_eq!(out.params, vec!["outer"]);
    }

    #[test]
    fn test_dollar_tag_mismatch_keeps_literal_open() {
        let out = dollar("$a$ $b$ :x $a$ :y");
        assert_eq!(out.sql, "$a$ $b$ :x $a$ $1");
        assert_eq!(out.params, vec!["y"]);
    }

    #[test]
    fn test_positional_dollar_is_not_a_quote() {
        let out = dollar("SELECT $1, :name, price$usd FROM t");
        assert_eq!(out.sql, "SELECT $1, $1, price$usd FROM t");
        assert_eq!(out.params, vec!["name"]);
    }

    #[test]
    fn test_dollar_tag_aborted_by_param() {
        let out = dollar("$:a");
        assert_eq!(out.sql, "$$1");
        assert_eq!(out.params, vec!["a"]);
    }

    #[test]
    fn test_unterminated_regions_are_reported() {
        let cases = [
            ("SELECT 'open :a", Region::StringConstant),
            ("SELECT \"open :a", Region::QuotedIdentifier),
            ("SELECT /* open /* */ :a", Region::BlockComment),
            ("SELECT $q$ open :a", Region::DollarQuoteLiteral),
        ];
        for (query, region) in cases {
            let out = dollar(query);
            assert_eq!(out.sql, query);
            assert!(out.params.is_empty(), "{query}");
            assert_eq!(out.unterminated, Some(region), "{query}");
        }
    }

    #[test]
    fn test_line_comment_at_end_is_not_unterminated() {
        let out = dollar("SELECT 1 -- done");
        assert_eq!(out.unterminated, None);
    }

    #[test]
    fn test_combine_duplicates() {
        let q = "SELECT * FROM foo WHERE id = :id OR id > :id";
        let out = scan(q, BindStyle::Dollar, true);
        assert_eq!(out.sql, "SELECT * FROM foo WHERE id = $1 OR id > $1");
        assert_eq!(out.params, vec!["id"]);

        let out = scan(q, BindStyle::At, true);
        assert_eq!(out.sql, "SELECT * FROM foo WHERE id = @p1 OR id > @p1");

        let out = scan(q, BindStyle::Question, true);
        assert_eq!(out.sql, "SELECT * FROM foo WHERE id = ? OR id > ?");
        assert_eq!(out.params, vec!["id", "id"]);
    }

    #[test]
    fn test_identifier_stops_at_non_decimal_number() {
        let out = dollar("SELECT :a² , :b");
        assert_eq!(out.sql, "SELECT $1² , $2");
        assert_eq!(out.params, vec!["a", "b"]);
    }

    #[test]
    fn test_letter_number_does_not_start_a_param() {
        let out = dollar("SELECT :Ⅷx, :y");
        assert_eq!(out.sql, "SELECT :Ⅷx, $1");
        assert_eq!(out.params, vec!["y"]);
    }

    #[test]
    fn test_identifier_classes() {
        assert!(is_ident_start('é'));
        assert!(is_ident_start('名'));
        assert!(is_ident_start('_'));
        assert!(!is_ident_start('1'));
        assert!(!is_ident_start('Ⅷ'));
        assert!(is_ident_part('٣'));
        assert!(is_ident_part('.'));
        assert!(!is_ident_part('²'));
        assert!(!is_ident_part('\u{301}'));
    }

    #[test]
    fn test_unknown_style_combines_duplicates() {
        let out = scan(
            "SELECT * FROM foo WHERE id = :id OR id > :id",
            BindStyle::Unknown,
            true,
        );
        assert_eq!(out.sql, "SELECT * FROM foo WHERE id = ? OR id > ?");
        assert_eq!(out.params, vec!["id"]);
    }

    #[test]
    fn test_rewritten_serializes() {
        let out = dollar("SELECT :a");
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["sql"], "SELECT $1");
        assert_eq!(json["params"][0], "a");
        assert!(json.get("unterminated").is_none());

        let out = dollar("'");
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["unterminated"], "string_constant");
    }
}
