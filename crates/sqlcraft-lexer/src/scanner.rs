use smol_str::SmolStr;

use crate::error::LexError;
use crate::keywords;
use crate::span::Span;
use crate::token::{Comment, CommentPlacement, Token, TokenKind, TokenKindSet};

pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    pending: Vec<Comment>,
    same_line: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Scanner { src, bytes: src.as_bytes(), pos: 0, tokens: Vec::new(), pending: Vec::new(), same_line: true }
    }

    pub fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.skip_trivia()?;
            if self.pos >= self.bytes.len() {
                break;
            }
            let token = self.scan_token()?;
            self.same_line = true;
            self.tokens.push(token);
        }
        let eof_span = Span::at(self.bytes.len());
        let mut eof = Token::new(TokenKind::Eof, "", eof_span);
        eof.comments.append(&mut self.pending);
        self.tokens.push(eof);
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => self.pos += 1,
                Some(b'\n') => {
                    self.pos += 1;
                    self.same_line = false;
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => self.scan_line_comment(),
                Some(b'/') if self.peek_at(1) == Some(b'*') => self.scan_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_line_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
        self.attach_comment(start, self.pos, false);
    }

    fn scan_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 2;
        loop {
            match self.peek() {
                None => return Err(LexError::unterminated(Span::new(start, self.pos))),
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.pos += 2;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.attach_comment(start, self.pos, true);
        Ok(())
    }

    fn attach_comment(&mut self, start: usize, end: usize, block: bool) {
        let inner = if block { &self.src[start + 2..end - 2] } else { &self.src[start + 2..end] };
        let comment = Comment {
            text: SmolStr::new(inner),
            placement: CommentPlacement::Before,
            span: Span::new(start, end),
            block,
        };
        if self.same_line && self.pending.is_empty() {
            if let Some(last) = self.tokens.last_mut() {
                let mut after = comment;
                after.placement = CommentPlacement::After;
                last.comments.push(after);
                return;
            }
        }
        self.pending.push(comment);
    }

    fn take_pending(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.pending)
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let b = self.peek().expect("caller checked bounds");

        let mut token = match b {
            b'(' => self.single(TokenKind::OpenParen),
            b')' => self.single(TokenKind::CloseParen),
            b',' => self.single(TokenKind::Comma),
            b'\'' => self.scan_string(start, false)?,
            b'"' => self.scan_quoted_identifier(start, b'"')?,
            b'`' => self.scan_quoted_identifier(start, b'`')?,
            b'[' => self.scan_bracketed_identifier(start)?,
            b':' => self.scan_colon_or_cast(start),
            b'?' => self.single(TokenKind::Parameter),
            b'$' => self.scan_dollar_parameter(start),
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(start)?,
            b'0'..=b'9' => self.scan_number(start)?,
            b'+' | b'-' if self.can_fold_sign() && self.sign_starts_number() => self.scan_number(start)?,
            b'e' | b'E' if self.peek_at(1) == Some(b'\'') => self.scan_string(start, true)?,
            _ if is_ident_start(b) => self.scan_identifier(start),
            _ if is_operator_byte(b) => self.scan_operator(start),
            _ => self.single(TokenKind::Operator),
        };
        token.comments = self.take_pending();
        Ok(token)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.pos += 1;
        Token::new(kind, &self.src[start..self.pos], Span::new(start, self.pos))
    }

    fn can_fold_sign(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(t) => !matches!(
                t.kind,
                TokenKind::Identifier | TokenKind::Literal | TokenKind::CloseParen | TokenKind::Parameter
            ),
        }
    }

    fn sign_starts_number(&self) -> bool {
        match self.peek_at(1) {
            Some(c) if c.is_ascii_digit() => true,
            Some(b'.') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn scan_colon_or_cast(&mut self, start: usize) -> Token {
        if self.peek_at(1) == Some(b':') {
            self.pos += 2;
            return Token::new(TokenKind::Operator, "::", Span::new(start, self.pos));
        }
        if self.peek_at(1).is_some_and(is_ident_start) {
            self.pos += 1;
            while self.peek().is_some_and(is_ident_continue) {
                self.pos += 1;
            }
            return Token::new(TokenKind::Parameter, &self.src[start..self.pos], Span::new(start, self.pos));
        }
        self.single(TokenKind::Operator)
    }

    fn scan_dollar_parameter(&mut self, start: usize) -> Token {
        self.pos += 1;
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            return Token::new(TokenKind::Parameter, &self.src[start..self.pos], Span::new(start, self.pos));
        }
        Token::new(TokenKind::Parameter, &self.src[start..self.pos], Span::new(start, self.pos))
    }

    fn scan_string(&mut self, start: usize, dialect_prefixed: bool) -> Result<Token, LexError> {
        if dialect_prefixed {
            self.pos += 1; // consume the 'e'/'E' prefix
        }
        self.pos += 1; // opening quote
        loop {
            match self.peek() {
                None => return Err(LexError::unterminated(Span::new(start, self.pos))),
                Some(b'\\') if dialect_prefixed => self.pos += 2,
                Some(b'\'') if self.peek_at(1) == Some(b'\'') => self.pos += 2,
                Some(b'\'') => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        let span = Span::new(start, self.pos);
        let mut token = Token::new(TokenKind::Literal, &self.src[start..self.pos], span);
        if dialect_prefixed {
            token = token.with_classes(TokenKindSet::single(TokenKind::StringSpecifier));
        }
        Ok(token)
    }

    fn scan_quoted_identifier(&mut self, start: usize, delim: u8) -> Result<Token, LexError> {
        self.pos += 1;
        loop {
            match self.peek() {
                None => return Err(LexError::unterminated(Span::new(start, self.pos))),
                Some(c) if c == delim && self.peek_at(1) == Some(delim) => self.pos += 2,
                Some(c) if c == delim => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        Ok(Token::new(TokenKind::Identifier, &self.src[start..self.pos], Span::new(start, self.pos)))
    }

    fn scan_bracketed_identifier(&mut self, start: usize) -> Result<Token, LexError> {
        self.pos += 1;
        loop {
            match self.peek() {
                None => return Err(LexError::unterminated(Span::new(start, self.pos))),
                Some(b']') if self.peek_at(1) == Some(b']') => self.pos += 2,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        Ok(Token::new(TokenKind::Identifier, &self.src[start..self.pos], Span::new(start, self.pos)))
    }

    fn scan_number(&mut self, start: usize) -> Result<Token, LexError> {
        let mut folded_sign = false;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            folded_sign = true;
            self.pos += 1;
        }
        let digits_start = self.pos;

        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x') | Some(b'X')) {
            self.pos += 2;
            let hex_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            if self.pos == hex_start {
                return Err(LexError::malformed_number(Span::new(start, self.pos)));
            }
            let span = Span::new(start, self.pos);
            return Ok(Token::new(TokenKind::Literal, &self.src[start..self.pos], span));
        }

        let leading_dot = self.peek() == Some(b'.');
        let mut saw_digit = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            saw_digit = true;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
                saw_digit = true;
            }
        }
        if !saw_digit {
            return Err(LexError::malformed_number(Span::new(start, self.pos)));
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let exp_mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            let exp_digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            if self.pos == exp_digits_start {
                self.pos = exp_mark; // not actually an exponent; leave for next token
            }
        }

        let span = Span::new(start, self.pos);
        let raw = &self.src[digits_start..self.pos];
        let value = if leading_dot { format!("0{raw}") } else { raw.to_string() };
        let value = if folded_sign { format!("{}{value}", &self.src[start..digits_start]) } else { value };
        Ok(Token::new(TokenKind::Literal, value, span))
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let word = &self.src[start..self.pos];
        let span = Span::new(start, self.pos);

        if keywords::is_normalization_form(word) {
            return Token::new(TokenKind::Literal, word, span);
        }
        if keywords::is_literal_keyword(word) {
            return Token::new(TokenKind::Literal, word, span);
        }
        if self.followed_by_open_paren() {
            return Token::new(TokenKind::Function, word, span)
                .with_classes(TokenKindSet::single(TokenKind::Identifier));
        }
        if keywords::is_command_keyword(word) {
            return Token::new(TokenKind::Command, word, span);
        }
        if keywords::is_type_keyword(word) {
            return Token::new(TokenKind::Identifier, word, span)
                .with_classes(TokenKindSet::single(TokenKind::Type));
        }
        Token::new(TokenKind::Identifier, word, span)
    }

    fn followed_by_open_paren(&self) -> bool {
        let mut i = self.pos;
        while let Some(c) = self.bytes.get(i) {
            match c {
                b' ' | b'\t' | b'\r' | b'\n' => i += 1,
                b'(' => return true,
                _ => return false,
            }
        }
        false
    }

    fn scan_operator(&mut self, start: usize) -> Token {
        static MULTI: &[&str] = &["<=", ">=", "<>", "!=", "||", "::"];
        for op in MULTI {
            if self.src[self.pos..].starts_with(op) {
                self.pos += op.len();
                return Token::new(TokenKind::Operator, *op, Span::new(start, self.pos));
            }
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            return Token::new(TokenKind::Dot, ".", Span::new(start, self.pos));
        }
        self.pos += 1;
        Token::new(TokenKind::Operator, &self.src[start..self.pos], Span::new(start, self.pos))
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn is_operator_byte(b: u8) -> bool {
    matches!(b, b'+' | b'-' | b'*' | b'/' | b'%' | b'=' | b'<' | b'>' | b'!' | b'|' | b'.')
}

#[cfg(test)]
mod tests {
    use crate::{lex, CommentPlacement, TokenKind};

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn simple_select() {
        let toks = lex("select a, b from t where a = 1").unwrap();
        assert_eq!(toks.first().unwrap().kind, TokenKind::Command);
        assert_eq!(toks.last().unwrap().kind, TokenKind::Eof);
        assert!(toks.iter().any(|t| t.kind == TokenKind::Comma));
    }

    #[test]
    fn function_call_detected() {
        let toks = lex("select count(*) from t").unwrap();
        assert_eq!(toks[1].kind, TokenKind::Function);
        assert!(toks[1].is(TokenKind::Identifier));
    }

    #[test]
    fn leading_dot_normalized() {
        let toks = lex("select .5").unwrap();
        let lit = toks.iter().find(|t| t.kind == TokenKind::Literal).unwrap();
        assert_eq!(lit.value.as_str(), "0.5");
    }

    #[test]
    fn folded_unary_sign() {
        let toks = lex("select -5, 1 - 5").unwrap();
        let literals: Vec<_> = toks.iter().filter(|t| t.kind == TokenKind::Literal).collect();
        assert_eq!(literals[0].value.as_str(), "-5");
        assert_eq!(literals[1].value.as_str(), "1");
        assert_eq!(literals[2].value.as_str(), "5");
        assert!(toks.iter().any(|t| t.kind == TokenKind::Operator && t.value == "-"));
    }

    #[test]
    fn hex_and_exponent() {
        assert_eq!(kinds("select 0xFF, 1e10")[1], TokenKind::Literal);
        let toks = lex("select 0xFF, 1e10").unwrap();
        let literals: Vec<_> = toks.iter().filter(|t| t.kind == TokenKind::Literal).collect();
        assert_eq!(literals[0].value.as_str(), "0xFF");
        assert_eq!(literals[1].value.as_str(), "1e10");
    }

    #[test]
    fn dialect_prefixed_string() {
        let toks = lex("select E'a\\'b'").unwrap();
        let lit = toks.iter().find(|t| t.kind == TokenKind::Literal).unwrap();
        assert!(lit.is(TokenKind::StringSpecifier));
    }

    #[test]
    fn doubled_quote_escape_in_string() {
        let toks = lex("select 'it''s'").unwrap();
        let lit = toks.iter().find(|t| t.kind == TokenKind::Literal).unwrap();
        assert_eq!(lit.value.as_str(), "'it''s'");
    }

    #[test]
    fn unterminated_string_errors() {
        let err = lex("select 'abc").unwrap_err();
        assert_eq!(err.kind, crate::LexErrorKind::Unterminated);
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let err = lex("select 1 /* oops").unwrap_err();
        assert_eq!(err.kind, crate::LexErrorKind::Unterminated);
    }

    #[test]
    fn malformed_number_errors() {
        let err = lex("select 0x").unwrap_err();
        assert_eq!(err.kind, crate::LexErrorKind::MalformedNumber);
    }

    #[test]
    fn trailing_comment_attaches_after() {
        let toks = lex("select a -- trailing\nfrom t").unwrap();
        let a = toks.iter().find(|t| t.value == "a").unwrap();
        assert_eq!(a.comments.len(), 1);
        assert_eq!(a.comments[0].placement, CommentPlacement::After);
        assert_eq!(a.comments[0].text.as_str(), " trailing");
    }

    #[test]
    fn leading_comment_attaches_before() {
        let toks = lex("select\n-- leading\na from t").unwrap();
        let a = toks.iter().find(|t| t.value == "a").unwrap();
        assert_eq!(a.comments.len(), 1);
        assert_eq!(a.comments[0].placement, CommentPlacement::Before);
    }

    #[test]
    fn separator_block_comment_preserved() {
        let toks = lex("select 1 /* ---------- */ , 2").unwrap();
        let comment = toks.iter().flat_map(|t| t.comments.iter()).find(|c| c.block).unwrap();
        assert_eq!(comment.text.as_str(), " ---------- ");
    }

    #[test]
    fn quoted_identifiers() {
        let toks = lex(r#"select "My Col", `other`, [bracketed] from t"#).unwrap();
        let idents: Vec<_> = toks.iter().filter(|t| t.kind == TokenKind::Identifier).collect();
        assert_eq!(idents[0].value.as_str(), "\"My Col\"");
        assert_eq!(idents[1].value.as_str(), "`other`");
        assert_eq!(idents[2].value.as_str(), "[bracketed]");
    }

    #[test]
    fn parameter_forms() {
        let toks = lex("select :name, $1, ?").unwrap();
        let params: Vec<_> = toks.iter().filter(|t| t.kind == TokenKind::Parameter).collect();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].value.as_str(), ":name");
        assert_eq!(params[1].value.as_str(), "$1");
        assert_eq!(params[2].value.as_str(), "?");
    }

    #[test]
    fn literal_keywords() {
        let toks = lex("select null, true, false, current_timestamp").unwrap();
        assert!(toks.iter().filter(|t| t.kind == TokenKind::Literal).count() >= 4);
    }

    #[test]
    fn multi_char_operators() {
        let toks = lex("select a <= b, a <> b, a::int, a || b").unwrap();
        let ops: Vec<_> =
            toks.iter().filter(|t| t.kind == TokenKind::Operator).map(|t| t.value.as_str()).collect();
        assert!(ops.contains(&"<="));
        assert!(ops.contains(&"<>"));
        assert!(ops.contains(&"::"));
        assert!(ops.contains(&"||"));
    }
}
