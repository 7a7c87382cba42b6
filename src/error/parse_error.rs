use thiserror::Error;

/// Represents all errors that can occur during lexing or parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// A character that starts no token.
    #[error("Error on line {line}: character '{character}' is not known.")]
    UnknownCharacter {
        /// The offending character.
        character: char,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A string literal whose closing quote never appears.
    #[error("Error on line {line}: unterminated string literal.")]
    UnterminatedString {
        /// The source line where the string starts.
        line: usize,
    },
    /// Found an unexpected token while parsing.
    #[error("Error on line {line}: unexpected token {token}, expected {expected}.")]
    UnexpectedToken {
        /// The token encountered.
        token:    String,
        /// What the parser was looking for.
        expected: String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Reached the end of input unexpectedly.
    #[error("Error on line {line}: unexpected end of input, expected {expected}.")]
    UnexpectedEndOfInput {
        /// What the parser was looking for.
        expected: String,
        /// The last line seen before the input ran out.
        line:     usize,
    },
}
