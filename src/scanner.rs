use std::borrow::Cow;
use std::str::FromStr;

use strum_macros::{EnumString, IntoStaticStr};

/// SQL keywords recognized by the normalizer. Anything else alphabetic is an
/// identifier and keeps its original case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Keyword {
    All,
    And,
    As,
    Asc,
    Between,
    By,
    Case,
    Create,
    Cross,
    Delete,
    Desc,
    Distinct,
    Else,
    End,
    Except,
    Exists,
    External,
    Extract,
    Format,
    From,
    Full,
    Group,
    Having,
    In,
    Inner,
    Insert,
    Intersect,
    Into,
    Is,
    Join,
    Left,
    Like,
    Limit,
    Location,
    Materialized,
    Not,
    Null,
    On,
    Or,
    Order,
    Outer,
    Over,
    Partition,
    Replace,
    Right,
    Row,
    Select,
    Set,
    Stored,
    Table,
    Then,
    Trim,
    Union,
    Update,
    Values,
    View,
    When,
    Where,
    With,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Dot,
    Star,
    Equal,
    NotEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Plus,
    Minus,
    Slash,
    Concat,
    Cast,
    Keyword(Keyword),
    Identifier(String),
    Number(String),
    // Lexeme kept verbatim, quotes included.
    String(String),
    Other(char),
}

impl Token {
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Token::LeftParen => Cow::Borrowed("("),
            Token::RightParen => Cow::Borrowed(")"),
            Token::Comma => Cow::Borrowed(","),
            Token::Semicolon => Cow::Borrowed(";"),
            Token::Dot => Cow::Borrowed("."),
            Token::Star => Cow::Borrowed("*"),
            Token::Equal => Cow::Borrowed("="),
            Token::NotEqual => Cow::Borrowed("<>"),
            Token::BangEqual => Cow::Borrowed("!="),
            Token::Less => Cow::Borrowed("<"),
            Token::LessEqual => Cow::Borrowed("<="),
            Token::Greater => Cow::Borrowed(">"),
            Token::GreaterEqual => Cow::Borrowed(">="),
            Token::Plus => Cow::Borrowed("+"),
            Token::Minus => Cow::Borrowed("-"),
            Token::Slash => Cow::Borrowed("/"),
            Token::Concat => Cow::Borrowed("||"),
            Token::Cast => Cow::Borrowed("::"),
            Token::Keyword(keyword) => Cow::Borrowed((*keyword).into()),
            Token::Identifier(lexeme) | Token::Number(lexeme) | Token::String(lexeme) => {
                Cow::Borrowed(lexeme)
            }
            Token::Other(c) => Cow::Owned(c.to_string()),
        }
    }
}

/// Character-level tokenizer over one SQL statement.
///
/// Scanning never fails: unterminated strings and comments run to the end of
/// the input and unexpected characters come back as [`Token::Other`], so the
/// normalizer stays total over arbitrary hand-written SQL.
pub struct Scanner {
    source_chars: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source_chars: source.chars().collect(),
            tokens: vec![],
            start: 0,
            current: 0,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    fn advance(&mut self) -> char {
        let c = self.source_chars[self.current];
        self.current += 1;
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source_chars.len()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source_chars[self.current]
        }
    }

    fn peek_next_i(&self, i: usize) -> char {
        if self.current + i >= self.source_chars.len() {
            '\0'
        } else {
            self.source_chars[self.current + i]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != expected {
            return false;
        };

        self.current += 1;
        true
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn current_source_str(&self) -> String {
        self.source_chars[self.start..self.current].iter().collect()
    }

    pub fn scan(&mut self) {
        self.tokens.clear();
        self.start = 0;
        self.current = 0;
        while self.current < self.source_chars.len() {
            self.start = self.current;
            self.scan_token();
        }
    }

    fn skip_line_comment(&mut self) {
        loop {
            let peek_char = self.peek();
            if peek_char == '\n' || peek_char == '\0' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        // Unterminated comment: swallow the rest of the input.
        loop {
            if self.peek() == '\0' {
                break;
            }
            if self.peek() == '*' && self.peek_next_i(1) == '/' {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
    }

    fn match_string(&mut self, delimiter: char) {
        loop {
            if self.is_at_end() {
                break;
            }
            let c = self.advance();
            if c == delimiter {
                // A doubled delimiter is an escaped quote, not the end.
                if self.peek() == delimiter {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.add_token(Token::String(self.current_source_str()));
    }

    fn match_number(&mut self) {
        loop {
            let peek_char = self.peek();
            if peek_char.is_ascii_digit() || peek_char == '.' {
                self.advance();
            } else {
                break;
            }
        }
        self.add_token(Token::Number(self.current_source_str()));
    }

    fn match_keyword_or_identifier(&mut self) {
        loop {
            let peek_char = self.peek();
            if !(peek_char.is_alphanumeric() || peek_char == '_') {
                break;
            }
            self.advance();
        }
        let word = self.current_source_str();
        match Keyword::from_str(&word) {
            Ok(keyword) => self.add_token(Token::Keyword(keyword)),
            Err(_) => self.add_token(Token::Identifier(word)),
        }
    }

    fn scan_token(&mut self) {
        let curr_char = self.advance();
        match curr_char {
            '(' => self.add_token(Token::LeftParen),
            ')' => self.add_token(Token::RightParen),
            ',' => self.add_token(Token::Comma),
            ';' => self.add_token(Token::Semicolon),
            '*' => self.add_token(Token::Star),
            '+' => self.add_token(Token::Plus),
            '=' => self.add_token(Token::Equal),
            '.' => {
                if self.peek().is_ascii_digit() {
                    self.match_number();
                } else {
                    self.add_token(Token::Dot);
                }
            }
            '-' => {
                if self.match_char('-') {
                    self.skip_line_comment();
                } else {
                    self.add_token(Token::Minus);
                }
            }
            '/' => {
                if self.match_char('*') {
                    self.skip_block_comment();
                } else {
                    self.add_token(Token::Slash);
                }
            }
            '<' => {
                if self.match_char('>') {
                    self.add_token(Token::NotEqual);
                } else if self.match_char('=') {
                    self.add_token(Token::LessEqual);
                } else {
                    self.add_token(Token::Less);
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.add_token(Token::GreaterEqual);
                } else {
                    self.add_token(Token::Greater);
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.add_token(Token::BangEqual);
                } else {
                    self.add_token(Token::Other('!'));
                }
            }
            '|' => {
                if self.match_char('|') {
                    self.add_token(Token::Concat);
                } else {
                    self.add_token(Token::Other('|'));
                }
            }
            ':' => {
                if self.match_char(':') {
                    self.add_token(Token::Cast);
                } else {
                    self.add_token(Token::Other(':'));
                }
            }
            '\n' | '\r' | ' ' | '\t' => {}

            c if c == '\'' || c == '"' => {
                self.match_string(c);
            }

            c if c.is_ascii_digit() => {
                self.match_number();
            }

            c if c.is_alphabetic() || c == '_' => {
                self.match_keyword_or_identifier();
            }

            c => self.add_token(Token::Other(c)),
        }
    }
}
