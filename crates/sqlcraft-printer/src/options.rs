/// How a bare identifier gets quoted on output. `None` never quotes; the other
/// variants always quote, regardless of whether the source needed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierEscape {
    None,
    DoubleQuote,
    Backtick,
    Bracket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordCase {
    Upper,
    Lower,
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommaStyle {
    /// `a\n, b\n, c` — comma placed before the next item.
    Before,
    /// `a,\nb,\nc` — comma placed right after the preceding item.
    After,
    /// `a, b, c` — never breaks a line.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanBreak {
    SameLine,
    NewLine,
}

/// `Block`/`Line` force every comment to that form; `Smart` prefers line
/// comments, only falling back to block form when a comment originally
/// written as a block carries embedded newlines a line comment can't
/// represent without losing them. A comment whose body is a pure run of
/// separator characters (`-=_+#`) is always emitted as a block comment
/// regardless of this setting, since a line-comment version would swallow
/// whatever SQL follows it on the same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Block,
    Line,
    Smart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Generic,
    Postgres,
}

/// How parameter nodes are rendered, independent of the style they were
/// parsed with. `Positional`/`Anonymous` renumber by emission order as the
/// printer builds its parameter map, rather than echoing the source's own
/// numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterStyle {
    /// `:name` (sigil from `parameter_symbol`).
    Named,
    /// `$1`, `$2`, ... — one number per distinct parameter name, in the
    /// order it was first emitted.
    Positional,
    /// `?`, every time.
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrinterOptions {
    pub identifier_escape: IdentifierEscape,
    pub keyword_case: KeywordCase,
    /// Sigil used when emitting a named parameter (default `:`).
    pub parameter_symbol: char,
    pub parameter_style: ParameterStyle,
    pub indent_size: usize,
    pub indent_char: char,
    pub newline: &'static str,
    pub comma_break: CommaStyle,
    pub and_break: BooleanBreak,
    pub values_comma_break: bool,
    pub join_one_line: bool,
    pub when_one_line: bool,
    pub insert_columns_one_line: bool,
    pub parentheses_one_line: bool,
    pub export_comment: bool,
    pub comment_style: CommentStyle,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        PrinterOptions::generic()
    }
}

impl PrinterOptions {
    pub fn generic() -> Self {
        PrinterOptions {
            identifier_escape: IdentifierEscape::None,
            keyword_case: KeywordCase::Lower,
            parameter_symbol: ':',
            parameter_style: ParameterStyle::Named,
            indent_size: 4,
            indent_char: ' ',
            newline: "\n",
            comma_break: CommaStyle::None,
            and_break: BooleanBreak::SameLine,
            values_comma_break: true,
            join_one_line: true,
            when_one_line: true,
            insert_columns_one_line: true,
            parentheses_one_line: true,
            export_comment: true,
            comment_style: CommentStyle::Smart,
        }
    }

    pub fn postgres() -> Self {
        PrinterOptions { identifier_escape: IdentifierEscape::DoubleQuote, ..PrinterOptions::generic() }
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Generic => PrinterOptions::generic(),
            Preset::Postgres => PrinterOptions::postgres(),
        }
    }

    pub(crate) fn indent_unit(&self) -> String {
        self.indent_char.to_string().repeat(self.indent_size)
    }
}
