/// Literal keywords that lex as `Literal` tokens rather than `Command`/`Identifier`.
/// Checked case-insensitively.
static LITERAL_KEYWORDS: phf::Set<unicase::UniCase<&'static str>> = phf::phf_set! {
    unicase::UniCase::ascii("null"),
    unicase::UniCase::ascii("true"),
    unicase::UniCase::ascii("false"),
    unicase::UniCase::ascii("current_date"),
    unicase::UniCase::ascii("current_time"),
    unicase::UniCase::ascii("current_timestamp"),
    unicase::UniCase::ascii("localtime"),
    unicase::UniCase::ascii("localtimestamp"),
    unicase::UniCase::ascii("unbounded"),
    unicase::UniCase::ascii("normalized"),
};

static NORMALIZATION_FORMS: phf::Set<unicase::UniCase<&'static str>> = phf::phf_set! {
    unicase::UniCase::ascii("nfc"),
    unicase::UniCase::ascii("nfd"),
    unicase::UniCase::ascii("nfkc"),
    unicase::UniCase::ascii("nfkd"),
};

/// Reserved words that lex as `Command` (clause/statement keywords). Not
/// exhaustive of every SQL keyword — unrecognized bare words lex as `Identifier`,
/// which is safe because the parser decides grammar by position, not by a
/// closed keyword list.
static COMMAND_KEYWORDS: phf::Set<unicase::UniCase<&'static str>> = phf::phf_set! {
    unicase::UniCase::ascii("select"), unicase::UniCase::ascii("from"),
    unicase::UniCase::ascii("where"), unicase::UniCase::ascii("group"),
    unicase::UniCase::ascii("by"), unicase::UniCase::ascii("having"),
    unicase::UniCase::ascii("order"), unicase::UniCase::ascii("limit"),
    unicase::UniCase::ascii("offset"), unicase::UniCase::ascii("with"),
    unicase::UniCase::ascii("recursive"), unicase::UniCase::ascii("as"),
    unicase::UniCase::ascii("join"), unicase::UniCase::ascii("inner"),
    unicase::UniCase::ascii("left"), unicase::UniCase::ascii("right"),
    unicase::UniCase::ascii("full"), unicase::UniCase::ascii("outer"),
    unicase::UniCase::ascii("cross"), unicase::UniCase::ascii("on"),
    unicase::UniCase::ascii("using"), unicase::UniCase::ascii("union"),
    unicase::UniCase::ascii("intersect"), unicase::UniCase::ascii("except"),
    unicase::UniCase::ascii("all"), unicase::UniCase::ascii("distinct"),
    unicase::UniCase::ascii("insert"), unicase::UniCase::ascii("update"),
    unicase::UniCase::ascii("delete"), unicase::UniCase::ascii("merge"),
    unicase::UniCase::ascii("into"), unicase::UniCase::ascii("values"),
    unicase::UniCase::ascii("set"), unicase::UniCase::ascii("when"),
    unicase::UniCase::ascii("matched"), unicase::UniCase::ascii("then"),
    unicase::UniCase::ascii("not"), unicase::UniCase::ascii("do"),
    unicase::UniCase::ascii("nothing"), unicase::UniCase::ascii("and"),
    unicase::UniCase::ascii("or"), unicase::UniCase::ascii("case"),
    unicase::UniCase::ascii("else"),
    unicase::UniCase::ascii("end"), unicase::UniCase::ascii("cast"),
    unicase::UniCase::ascii("over"), unicase::UniCase::ascii("partition"),
    unicase::UniCase::ascii("window"), unicase::UniCase::ascii("asc"),
    unicase::UniCase::ascii("desc"), unicase::UniCase::ascii("nulls"),
    unicase::UniCase::ascii("first"), unicase::UniCase::ascii("last"),
    unicase::UniCase::ascii("in"), unicase::UniCase::ascii("like"),
    unicase::UniCase::ascii("ilike"), unicase::UniCase::ascii("between"),
    unicase::UniCase::ascii("is"), unicase::UniCase::ascii("exists"),
    unicase::UniCase::ascii("array"), unicase::UniCase::ascii("fetch"),
    unicase::UniCase::ascii("row"), unicase::UniCase::ascii("rows"),
    unicase::UniCase::ascii("only"), unicase::UniCase::ascii("for"),
};

pub fn is_literal_keyword(word: &str) -> bool {
    if NORMALIZATION_FORMS.contains(&unicase::UniCase::new(word)) {
        return false;
    }
    LITERAL_KEYWORDS.contains(&unicase::UniCase::new(word))
}

/// True for `nfc|nfd|nfkc|nfkd` which prefix `normalized` as a literal unit.
pub fn is_normalization_form(word: &str) -> bool {
    NORMALIZATION_FORMS.contains(&unicase::UniCase::new(word))
}

pub fn is_command_keyword(word: &str) -> bool {
    COMMAND_KEYWORDS.contains(&unicase::UniCase::new(word))
}

static TYPE_KEYWORDS: phf::Set<unicase::UniCase<&'static str>> = phf::phf_set! {
    unicase::UniCase::ascii("int"), unicase::UniCase::ascii("integer"),
    unicase::UniCase::ascii("bigint"), unicase::UniCase::ascii("smallint"),
    unicase::UniCase::ascii("text"), unicase::UniCase::ascii("varchar"),
    unicase::UniCase::ascii("char"), unicase::UniCase::ascii("boolean"),
    unicase::UniCase::ascii("bool"), unicase::UniCase::ascii("date"),
    unicase::UniCase::ascii("timestamp"), unicase::UniCase::ascii("timestamptz"),
    unicase::UniCase::ascii("numeric"), unicase::UniCase::ascii("decimal"),
    unicase::UniCase::ascii("float"), unicase::UniCase::ascii("double"),
    unicase::UniCase::ascii("real"), unicase::UniCase::ascii("json"),
    unicase::UniCase::ascii("jsonb"), unicase::UniCase::ascii("uuid"),
    unicase::UniCase::ascii("bytea"),
};

pub fn is_type_keyword(word: &str) -> bool {
    TYPE_KEYWORDS.contains(&unicase::UniCase::new(word))
}
