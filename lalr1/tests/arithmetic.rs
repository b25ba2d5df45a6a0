//! Builds a tiny `S -> E; E -> E + E | n` grammar two ways -- left- and
//! right-associative `+` at the same precedence -- and checks the shape
//! of the tree each produces for `n+n+n`.

use lalr1::{build_parser, Child, Grammar, Rule, Symbol};
use lexan::{Lexer, LineStream, NORMAL_MODE};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tok {
    Num,
    Plus,
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
}

impl fmt::Display for Nt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, PartialEq)]
enum Expr {
    Num(i64),
    Plus(Box<Expr>, Box<Expr>),
}

fn grammar(right_associative: bool) -> Grammar<Tok, Nt> {
    let rules = vec![
        Rule::new(
            Symbol::NonTerminal(Nt::S),
            vec![Symbol::NonTerminal(Nt::E)],
        ),
        Rule::new(
            Symbol::NonTerminal(Nt::E),
            vec![
                Symbol::NonTerminal(Nt::E),
                Symbol::Terminal(Tok::Plus),
                Symbol::NonTerminal(Nt::E),
            ],
        )
        .with_precedence(10, right_associative),
        Rule::new(
            Symbol::NonTerminal(Nt::E),
            vec![Symbol::Terminal(Tok::Num)],
        ),
    ];
    Grammar::new(Nt::S, vec![Tok::Eof], rules)
}

fn parse(right_associative: bool, text: &str) -> Expr {
    let grammar = grammar(right_associative);
    let parser = build_parser(&grammar, BTreeMap::new(), lexan::CHANNEL_DEFAULT)
        .expect("grammar builds without conflicts");
    let lexer = Lexer::single_mode(&[(r"[0-9]+", Tok::Num), (r"\+", Tok::Plus)])
        .expect("lexer rules are well-formed");
    let mut stream = LineStream::new(text);

    parser
        .parse(
            &mut stream,
            &mut |stream, mode| {
                assert_eq!(mode, NORMAL_MODE);
                lexer.next_token(stream, mode, Tok::Eof)
            },
            &mut |lhs, _span, mut children, _mode| match lhs {
                Nt::S => match children.pop().expect("S -> E has one child") {
                    Child::Node(e) => e,
                    Child::Token(_) => panic!("S's child is always a reduction"),
                },
                Nt::E if children.len() == 1 => match children.pop().expect("checked len") {
                    Child::Token(t) => Expr::Num(t.lexeme().parse().expect("lexed as digits")),
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
            },
        )
        .expect("well-formed input parses")
}

#[test]
fn left_associative_plus_nests_on_the_left() {
    let tree = parse(false, "1+2+3");
    assert_eq!(
        tree,
        Expr::Plus(
            Box::new(Expr::Plus(Box::new(Expr::Num(1)), Box::new(Expr::Num(2)))),
            Box::new(Expr::Num(3)),
        )
    );
}

#[test]
fn right_associative_plus_nests_on_the_right() {
    let tree = parse(true, "1+2+3");
    assert_eq!(
        tree,
        Expr::Plus(
            Box::new(Expr::Num(1)),
            Box::new(Expr::Plus(Box::new(Expr::Num(2)), Box::new(Expr::Num(3)))),
        )
    );
}

#[test]
fn rejects_input_the_grammar_does_not_accept() {
    let grammar = grammar(false);
    let parser = build_parser(&grammar, BTreeMap::new(), lexan::CHANNEL_DEFAULT).unwrap();
    let lexer = Lexer::single_mode(&[(r"[0-9]+", Tok::Num), (r"\+", Tok::Plus)]).unwrap();
    let mut stream = LineStream::new("+1");
    let result = parser.parse(
        &mut stream,
        &mut |stream, mode| lexer.next_token(stream, mode, Tok::Eof),
        &mut |_lhs, _span, _children, _mode| (),
    );
    assert!(matches!(result, Err(lalr1::Error::Parse(_))));
}
