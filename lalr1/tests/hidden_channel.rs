//! `n /*c1*/ + /*c2*/ n` must parse identically to `n + n`: comment tokens
//! ride a hidden channel and are consumed by an auxiliary comment grammar
//! spliced in between main-channel lookaheads, never reaching the main
//! parser's action/goto table.

use lalr1::{build_parser, Child, Grammar, Rule, Symbol};
use lexan::{Lexer, LineStream, NORMAL_MODE};
use std::collections::BTreeMap;
use std::fmt;

const COMMENT_CHANNEL: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tok {
    Num,
    Plus,
    Comment,
    Eof,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Nt {
    S,
    E,
    CommentStart,
    CommentRun,
}

impl fmt::Display for Nt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, PartialEq)]
enum Expr {
    Num(String),
    Plus(Box<Expr>, Box<Expr>),
}

fn main_grammar() -> Grammar<Tok, Nt> {
    let rules = vec![
        Rule::new(Symbol::NonTerminal(Nt::S), vec![Symbol::NonTerminal(Nt::E)]),
        Rule::new(
            Symbol::NonTerminal(Nt::E),
            vec![
                Symbol::NonTerminal(Nt::E),
                Symbol::Terminal(Tok::Plus),
                Symbol::NonTerminal(Nt::E),
            ],
        )
        .with_precedence(10, false),
        Rule::new(Symbol::NonTerminal(Nt::E), vec![Symbol::Terminal(Tok::Num)]),
    ];
    Grammar::new(Nt::S, vec![Tok::Eof], rules)
}

/// The auxiliary grammar run on the comment channel: a left-recursive run
/// of one or more comment/whitespace tokens, reduced a token at a time as
/// the lexer hands them over, wrapped in the single-RHS-symbol start rule
/// every grammar (main or hidden) must have. Its end symbols are the main
/// grammar's own terminals, since the run only ends when a main-channel
/// token appears.
fn comment_grammar() -> Grammar<Tok, Nt> {
    let rules = vec![
        Rule::new(
            Symbol::NonTerminal(Nt::CommentStart),
            vec![Symbol::NonTerminal(Nt::CommentRun)],
        ),
        Rule::new(
            Symbol::NonTerminal(Nt::CommentRun),
            vec![
                Symbol::NonTerminal(Nt::CommentRun),
                Symbol::Terminal(Tok::Comment),
            ],
        ),
        Rule::new(
            Symbol::NonTerminal(Nt::CommentRun),
            vec![Symbol::Terminal(Tok::Comment)],
        ),
    ];
    Grammar::new(Nt::CommentStart, vec![Tok::Num, Tok::Plus, Tok::Eof], rules)
}

fn lexer() -> Lexer<Tok> {
    Lexer::new(&[
        (NORMAL_MODE, r"n", Tok::Num, lexan::CHANNEL_DEFAULT),
        (NORMAL_MODE, r"\+", Tok::Plus, lexan::CHANNEL_DEFAULT),
        (NORMAL_MODE, r"/\*[^*]*\*/", Tok::Comment, COMMENT_CHANNEL),
        (NORMAL_MODE, r"[ \t]+", Tok::Comment, COMMENT_CHANNEL),
    ])
    .expect("lexer rules are well-formed")
}

fn parse(text: &str) -> Expr {
    let mut hidden = BTreeMap::new();
    hidden.insert(COMMENT_CHANNEL, comment_grammar());

    let grammar = main_grammar();
    let parser =
        build_parser(&grammar, hidden, lexan::CHANNEL_DEFAULT).expect("grammar builds without conflicts");
    let lexer = lexer();
    let mut stream = LineStream::new(text);

    parser
        .parse(
            &mut stream,
            &mut |stream, mode| lexer.next_token(stream, mode, Tok::Eof),
            &mut |lhs, _span, mut children, _mode| match lhs {
                Nt::S => match children.pop().expect("S -> E has one child") {
                    Child::Node(e) => e,
                    Child::Token(_) => panic!("S's child is always a reduction"),
                },
                Nt::E if children.len() == 1 => match children.pop().expect("checked len") {
                    Child::Token(t) => Expr::Num(t.lexeme().to_string()),
                    Child::Node(_) => panic!("E -> n's only child is a token"),
                },
                Nt::E => {
                    let mut it = children.into_iter();
                    let left = match it.next().expect("E + E has a left operand") {
                        Child::Node(e) => e,
                        Child::Token(_) => panic!("left operand is always a reduction"),
                    };
                    it.next(); // the `+` token
                    let right = match it.next().expect("E + E has a right operand") {
                        Child::Node(e) => e,
                        Child::Token(_) => panic!("right operand is always a reduction"),
                    };
                    Expr::Plus(Box::new(left), Box::new(right))
                }
                Nt::CommentStart | Nt::CommentRun => {
                    unreachable!("the comment grammar never reduces in the main parser")
                }
            },
        )
        .expect("comments on a hidden channel never reach the main grammar")
}

#[test]
fn comments_between_tokens_are_invisible_to_the_main_grammar() {
    let with_comments = parse("n /*c1*/ + /*c2*/ n");
    let without_comments = parse("n + n");
    assert_eq!(with_comments, without_comments);
}
