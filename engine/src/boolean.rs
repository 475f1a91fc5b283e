//! Boolean retrieval: query string -> expression tree -> document set.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := and (OR and)*
//! and     := unary (AND unary)*
//! unary   := NOT unary | primary
//! primary := '(' expr ')' | word
//! ```
//!
//! `AND`/`OR`/`NOT` also accept the Russian synonyms `И`/`ИЛИ`/`НЕ`.
//! Evaluation is a recursive interpreter over the parsed tree; queries
//! are never turned into executable code.

use std::collections::BTreeSet;

use crate::error::ParseError;
use crate::index::InvertedIndex;
use crate::normalize::Normalizer;
use crate::DocId;

/// Immutable once parsed; evaluated without mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    Term(String),
    And(Box<QueryExpr>, Box<QueryExpr>),
    Or(Box<QueryExpr>, Box<QueryExpr>),
    Not(Box<QueryExpr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Word(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl Tok {
    fn describe(&self) -> &'static str {
        match self {
            Tok::Word(_) => "term",
            Tok::And => "'AND'",
            Tok::Or => "'OR'",
            Tok::Not => "'NOT'",
            Tok::LParen => "'('",
            Tok::RParen => "')'",
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

fn lex(input: &str) -> Result<Vec<(Tok, usize)>, ParseError> {
    let mut out = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(i, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            out.push((Tok::LParen, i));
            chars.next();
        } else if c == ')' {
            out.push((Tok::RParen, i));
            chars.next();
        } else if is_word_char(c) {
            let start = i;
            let mut end = i + c.len_utf8();
            chars.next();
            while let Some(&(j, d)) = chars.peek() {
                if !is_word_char(d) {
                    break;
                }
                end = j + d.len_utf8();
                chars.next();
            }
            let word = &input[start..end];
            let tok = match word.to_uppercase().as_str() {
                "AND" | "И" => Tok::And,
                "OR" | "ИЛИ" => Tok::Or,
                "NOT" | "НЕ" => Tok::Not,
                _ => Tok::Word(word.to_string()),
            };
            out.push((tok, start));
        } else {
            return Err(ParseError::new(i, format!("unexpected character {c:?}")));
        }
    }
    Ok(out)
}

struct Parser {
    toks: Vec<(Tok, usize)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(Tok, usize)> {
        self.toks.get(self.pos)
    }

    fn bump(&mut self) -> Option<(Tok, usize)> {
        let tok = self.toks.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Offset to report when the query ends too early.
    fn here(&self) -> usize {
        self.peek().map(|&(_, off)| off).unwrap_or(self.end)
    }

    fn expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut lhs = self.and_expr()?;
        while matches!(self.peek(), Some((Tok::Or, _))) {
            self.bump();
            let rhs = self.and_expr()?;
            lhs = QueryExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut lhs = self.unary()?;
        while matches!(self.peek(), Some((Tok::And, _))) {
            self.bump();
            let rhs = self.unary()?;
            lhs = QueryExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<QueryExpr, ParseError> {
        if matches!(self.peek(), Some((Tok::Not, _))) {
            self.bump();
            let inner = self.unary()?;
            return Ok(QueryExpr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<QueryExpr, ParseError> {
        let at = self.here();
        match self.bump() {
            Some((Tok::Word(word), _)) => Ok(QueryExpr::Term(word)),
            Some((Tok::LParen, open_at)) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some((Tok::RParen, _)) => Ok(inner),
                    _ => Err(ParseError::new(open_at, "unbalanced '('")),
                }
            }
            Some((tok, off)) => Err(ParseError::new(
                off,
                format!("expected a term or '(', found {}", tok.describe()),
            )),
            None => Err(ParseError::new(at, "expected a term or '('")),
        }
    }
}

/// Parse a boolean query into its expression tree.
pub fn parse(query: &str) -> Result<QueryExpr, ParseError> {
    let toks = lex(query)?;
    let mut parser = Parser {
        toks,
        pos: 0,
        end: query.len(),
    };
    if parser.peek().is_none() {
        return Err(ParseError::new(0, "empty query"));
    }
    let expr = parser.expr()?;
    if let Some((tok, off)) = parser.peek() {
        // Covers adjacent bare words and stray ')' alike.
        return Err(ParseError::new(
            *off,
            format!("expected an operator, found {}", tok.describe()),
        ));
    }
    Ok(expr)
}

/// Evaluate a parsed tree against an index. A term leaf goes through
/// the same normalizer the index terms did; a leaf the index has never
/// seen is the empty set, not an error.
pub fn evaluate<N: Normalizer + ?Sized>(
    expr: &QueryExpr,
    index: &InvertedIndex,
    normalizer: &N,
) -> BTreeSet<DocId> {
    match expr {
        QueryExpr::Term(word) => {
            let term = normalizer.term(word);
            index
                .postings(&term)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default()
        }
        QueryExpr::And(a, b) => &evaluate(a, index, normalizer) & &evaluate(b, index, normalizer),
        QueryExpr::Or(a, b) => &evaluate(a, index, normalizer) | &evaluate(b, index, normalizer),
        QueryExpr::Not(inner) => &index.universe() - &evaluate(inner, index, normalizer),
    }
}

/// Parse and evaluate in one step.
pub fn search<N: Normalizer + ?Sized>(
    query: &str,
    index: &InvertedIndex,
    normalizer: &N,
) -> Result<BTreeSet<DocId>, ParseError> {
    let expr = parse(query)?;
    Ok(evaluate(&expr, index, normalizer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::SimpleNormalizer;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn index() -> InvertedIndex {
        InvertedIndex::build(&[
            toks(&["cat", "dog"]),
            toks(&["dog", "fish"]),
            toks(&["cat", "fish"]),
        ])
    }

    fn ids(set: BTreeSet<DocId>) -> Vec<DocId> {
        set.into_iter().collect()
    }

    #[test]
    fn parses_precedence_not_over_and_over_or() {
        let expr = parse("cat OR dog AND NOT fish").unwrap();
        assert_eq!(
            expr,
            QueryExpr::Or(
                Box::new(QueryExpr::Term("cat".into())),
                Box::new(QueryExpr::And(
                    Box::new(QueryExpr::Term("dog".into())),
                    Box::new(QueryExpr::Not(Box::new(QueryExpr::Term("fish".into())))),
                )),
            )
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let grouped = search("(cat OR dog) AND fish", &index(), &SimpleNormalizer).unwrap();
        assert_eq!(ids(grouped), vec![1, 2]);
        let flat = search("cat OR dog AND fish", &index(), &SimpleNormalizer).unwrap();
        assert_eq!(ids(flat), vec![0, 1, 2]);
    }

    #[test]
    fn and_or_not_examples() {
        let idx = index();
        assert_eq!(ids(search("cat AND dog", &idx, &SimpleNormalizer).unwrap()), vec![0]);
        assert_eq!(
            ids(search("cat OR fish", &idx, &SimpleNormalizer).unwrap()),
            vec![0, 1, 2]
        );
        assert_eq!(ids(search("NOT dog", &idx, &SimpleNormalizer).unwrap()), vec![2]);
    }

    #[test]
    fn russian_operator_synonyms() {
        let idx = index();
        assert_eq!(ids(search("cat И dog", &idx, &SimpleNormalizer).unwrap()), vec![0]);
        assert_eq!(
            ids(search("cat ИЛИ fish", &idx, &SimpleNormalizer).unwrap()),
            vec![0, 1, 2]
        );
        assert_eq!(ids(search("НЕ dog", &idx, &SimpleNormalizer).unwrap()), vec![2]);
    }

    #[test]
    fn unknown_terms_are_empty_not_errors() {
        let idx = index();
        assert!(search("unicorn", &idx, &SimpleNormalizer).unwrap().is_empty());
        assert_eq!(
            ids(search("unicorn OR cat", &idx, &SimpleNormalizer).unwrap()),
            vec![0, 2]
        );
    }

    #[test]
    fn query_terms_are_normalized_like_index_terms() {
        let idx = index();
        assert_eq!(ids(search("CAT AND Dog", &idx, &SimpleNormalizer).unwrap()), vec![0]);
    }

    #[test]
    fn and_or_are_commutative() {
        let idx = index();
        let norm = SimpleNormalizer;
        assert_eq!(
            search("cat AND dog", &idx, &norm).unwrap(),
            search("dog AND cat", &idx, &norm).unwrap()
        );
        assert_eq!(
            search("cat OR fish", &idx, &norm).unwrap(),
            search("fish OR cat", &idx, &norm).unwrap()
        );
    }

    #[test]
    fn double_negation_is_identity() {
        let idx = index();
        let norm = SimpleNormalizer;
        assert_eq!(
            search("NOT (NOT cat)", &idx, &norm).unwrap(),
            search("cat", &idx, &norm).unwrap()
        );
    }

    #[test]
    fn malformed_queries_report_offsets() {
        let err = parse("").unwrap_err();
        assert_eq!(err.offset, 0);

        let err = parse("cat AND").unwrap_err();
        assert_eq!(err.offset, 7);

        let err = parse("(cat OR dog").unwrap_err();
        assert_eq!(err.offset, 0);
        assert!(err.reason.contains("unbalanced"));

        // Adjacent bare words are not an implicit AND.
        let err = parse("cat dog").unwrap_err();
        assert_eq!(err.offset, 4);

        let err = parse("cat AND AND dog").unwrap_err();
        assert_eq!(err.offset, 8);

        let err = parse("cat & dog").unwrap_err();
        assert_eq!(err.offset, 4);
    }
}
