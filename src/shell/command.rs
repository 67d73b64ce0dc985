use chumsky::{prelude::*, regex::regex};

use crate::Key;
use crate::config::TreeKind;
use crate::traversal::Traversal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // INSERT key+
    Insert(Vec<Key>),

    // DELETE key+
    Delete(Vec<Key>),

    // FIND key
    Find(Key),

    // PRINT traversal?
    Print(Traversal),

    // SHOW
    Show,

    // STATS
    Stats,

    // CHECK
    Check,

    // NEW (BTREE order? | BST | AVL)
    New(TreeKind, Option<usize>),

    // CLEAR
    Clear,

    // HELP
    Help,

    // QUIT
    Quit,
}

pub const HELP: &str = "\
insert|add <key>...       insert keys
delete|remove <key>...    delete keys
find <key>                look a key up
print [pre|in|post|level] list keys in traversal order (default in)
show                      draw the tree level by level
stats                     size and shape of the tree
check                     verify the tree's structural invariants
new btree [order]         replace the tree with an empty B-tree
new bst | new avl         replace the tree with an empty binary tree
clear                     remove every key
help                      this text
quit|exit                 leave the shell";

/// Case-insensitive keyword that must end on a word boundary
fn keyword<'a>(words: &'static str) -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> {
    regex(&format!(r"(?i)\b(?:{words})\b")).padded()
}

fn key<'a>() -> impl Parser<'a, &'a str, Key, extra::Err<Rich<'a, char>>> {
    regex(r"[-+]?\d+")
        .try_map(|s: &str, span| {
            s.parse::<Key>()
                .map_err(|e| Rich::custom(span, format!("invalid key {}: {}", s, e)))
        })
        .padded()
}

fn keys<'a>() -> impl Parser<'a, &'a str, Vec<Key>, extra::Err<Rich<'a, char>>> {
    key().repeated().at_least(1).collect()
}

pub fn parser<'a>() -> impl Parser<'a, &'a str, Command, extra::Err<Rich<'a, char>>> {
    let insert = keyword("insert|add").ignore_then(keys()).map(Command::Insert);
    let delete = keyword("delete|remove").ignore_then(keys()).map(Command::Delete);
    let find = keyword("find").ignore_then(key()).map(Command::Find);

    let traversal = regex(r"(?i)\b(?:pre|in|post|level)(?:-?order)?\b")
        .try_map(|s: &str, span| s.parse::<Traversal>().map_err(|e| Rich::custom(span, e)))
        .padded();
    let print = keyword("print")
        .ignore_then(traversal.or_not())
        .map(|order| Command::Print(order.unwrap_or_default()));

    let order = regex(r"\d+")
        .try_map(|s: &str, span| {
            s.parse::<usize>()
                .map_err(|e| Rich::custom(span, format!("invalid order {}: {}", s, e)))
        })
        .padded();
    let new = keyword("new").ignore_then(choice((
        keyword("btree")
            .ignore_then(order.or_not())
            .map(|order| Command::New(TreeKind::BTree, order)),
        keyword("bst").to(Command::New(TreeKind::Bst, None)),
        keyword("avl").to(Command::New(TreeKind::Avl, None)),
    )));

    choice((
        insert,
        delete,
        find,
        print,
        keyword("show").to(Command::Show),
        keyword("stats").to(Command::Stats),
        keyword("check").to(Command::Check),
        new,
        keyword("clear").to(Command::Clear),
        keyword("help").to(Command::Help),
        keyword("quit|exit").to(Command::Quit),
    ))
    .then_ignore(end())
}

pub fn parse(input: &str) -> Result<Command, String> {
    parser().parse(input).into_result().map_err(|errs| {
        errs.iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    })
}
