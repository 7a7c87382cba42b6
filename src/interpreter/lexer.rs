use logos::Logos;

use crate::error::ParseError;

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// Keywords are matched ahead of identifiers, so `let` never lexes as a name.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    /// Numeric literal tokens, such as `3`, `3.14` or `0.5`.
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
    /// Single or double quoted string literals. Escapes are resolved while
    /// lexing.
    #[regex(r#""([^"\\]|\\(.|\n))*""#, unescape)]
    #[regex(r#"'([^'\\]|\\(.|\n))*'"#, unescape)]
    Str(String),
    /// Identifier tokens; variable or type names such as `x` or `Point`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `# Comments.`
    #[regex(r"#[^\n]*", logos::skip, allow_greedy = true)]
    Comment,
    /// Newlines only advance the line counter.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        logos::Skip
    })]
    Newline,

    /// `let`
    #[token("let")]
    Let,
    /// `mut`
    #[token("mut")]
    Mut,
    /// `fun`
    #[token("fun")]
    Fun,
    /// `ret`
    #[token("ret")]
    Ret,
    /// `if`
    #[token("if")]
    If,
    /// `els`
    #[token("els")]
    Els,
    /// `whl`
    #[token("whl")]
    While,
    /// `for`
    #[token("for")]
    For,
    /// `of`
    #[token("of")]
    Of,
    /// `brk`
    #[token("brk")]
    Brk,
    /// `cnt`
    #[token("cnt")]
    Cnt,
    /// `do`
    #[token("do")]
    Do,
    /// `err`
    #[token("err")]
    Raise,
    /// `cat`
    #[token("cat")]
    Catch,
    /// `mat`
    #[token("mat")]
    Mat,
    /// `tag`
    #[token("tag")]
    Tag,
    /// `str`
    #[token("str")]
    Struct,
    /// `use`
    #[token("use")]
    Use,
    /// `as`
    #[token("as")]
    As,
    /// `ext`
    #[token("ext")]
    Ext,
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `none`
    #[token("none")]
    NoneLiteral,

    /// `+`
    #[token("+")]
    Plus,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `-`
    #[token("-")]
    Minus,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `*`
    #[token("*")]
    Star,
    /// `*=`
    #[token("*=")]
    StarAssign,
    /// `/`
    #[token("/")]
    Slash,
    /// `/=`
    #[token("/=")]
    SlashAssign,
    /// `^`
    #[token("^")]
    Caret,
    /// `^=`
    #[token("^=")]
    CaretAssign,
    /// `%`
    #[token("%")]
    Percent,
    /// `%=`
    #[token("%=")]
    PercentAssign,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `=`
    #[token("=")]
    Equals,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `!`
    #[token("!")]
    Bang,
    /// `>`
    #[token(">")]
    Greater,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `<<`
    #[token("<<")]
    ShiftLeft,
    /// `>>`
    #[token(">>")]
    ShiftRight,
    /// `|`
    #[token("|")]
    Pipe,
    /// `||`
    #[token("||")]
    DoublePipe,
    /// `&`
    #[token("&")]
    Ampersand,
    /// `&&`
    #[token("&&")]
    DoubleAmpersand,
    /// `?`
    #[token("?")]
    Question,
    /// `??`
    #[token("??")]
    DoubleQuestion,
    /// `->`
    #[token("->")]
    Arrow,
    /// `.`
    #[token(".")]
    Dot,
    /// `..`
    #[token("..")]
    DotDot,
    /// `:`
    #[token(":")]
    Colon,
    /// `::`
    #[token("::")]
    ColonColon,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
}

/// Extra state for the lexer, used to track the current line number.
#[derive(Debug)]
pub struct LexerExtras {
    pub line: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line: 1 }
    }
}

fn unescape(lex: &mut logos::Lexer<Token>) -> Option<String> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => return None,
        }
    }
    Some(out)
}

/// On-demand tokenizer over a source string.
///
/// Each produced token carries the line it starts on. Multi-line string
/// literals advance the line counter after they are emitted.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { inner: Token::lexer(source) }
    }

    /// Returns the next token with its line, or `None` at the end of input.
    ///
    /// # Errors
    /// `ParseError::UnterminatedString` for a quote that is never closed,
    /// `ParseError::UnknownCharacter` for anything else the lexer rejects.
    pub fn next_token(&mut self) -> Result<Option<(Token, usize)>, ParseError> {
        let Some(result) = self.inner.next() else {
            return Ok(None);
        };
        let line = self.inner.extras.line;
        let slice = self.inner.slice();
        match result {
            Ok(token) => {
                if matches!(token, Token::Str(_)) {
                    self.inner.extras.line += slice.matches('\n').count();
                }
                Ok(Some((token, line)))
            },
            Err(()) if slice.starts_with(['"', '\'']) => Err(ParseError::UnterminatedString { line }),
            Err(()) => {
                let character = slice.chars().next().unwrap_or('?');
                Err(ParseError::UnknownCharacter { character, line })
            },
        }
    }

    /// Consumes the rest of the input into a token vector.
    pub fn tokenize(mut self) -> Result<Vec<(Token, usize)>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize()
                          .expect("lexing failed")
                          .into_iter()
                          .map(|(token, _)| token)
                          .collect()
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(kinds("let letter whl whale"),
                   vec![Token::Let,
                        Token::Identifier("letter".into()),
                        Token::While,
                        Token::Identifier("whale".into())]);
    }

    #[test]
    fn longest_operator_is_chosen() {
        assert_eq!(kinds("a ?? b .. c :: d -> e"),
                   vec![Token::Identifier("a".into()),
                        Token::DoubleQuestion,
                        Token::Identifier("b".into()),
                        Token::DotDot,
                        Token::Identifier("c".into()),
                        Token::ColonColon,
                        Token::Identifier("d".into()),
                        Token::Arrow,
                        Token::Identifier("e".into())]);
    }

    #[test]
    fn lines_are_tracked_across_comments_and_strings() {
        let tokens = Lexer::new("1 # one\n\"a\nb\"\n3").tokenize().expect("lexing failed");
        let lines: Vec<usize> = tokens.iter().map(|(_, line)| *line).collect();
        assert_eq!(lines, vec![1, 2, 4]);
        assert_eq!(tokens[1].0, Token::Str("a\nb".into()));
    }

    #[test]
    fn escapes_are_resolved() {
        assert_eq!(kinds(r#""say \"hi\"\n""#), vec![Token::Str("say \"hi\"\n".into())]);
        assert_eq!(kinds(r"'it\'s\t'"), vec![Token::Str("it's\t".into())]);
    }

    #[test]
    fn unknown_character_reports_line() {
        let err = Lexer::new("1\n@").tokenize().unwrap_err();
        assert!(matches!(err, ParseError::UnknownCharacter { character: '@', line: 2 }));
    }

    #[test]
    fn unterminated_string_is_reported() {
        let err = Lexer::new("let s = \"abc").tokenize().unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString { line: 1 }));
    }
}
