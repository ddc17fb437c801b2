//! Lenient argument handling for the listing tools.
//!
//! The legacy commands accept many more options than the wrappers implement.
//! Instead of failing, the wrappers split off what they do not understand and
//! warn about it.

use clap::{Arg, Command};
use std::iter::Peekable;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitArgs {
    /// Program name followed by every recognized argument
    pub known: Vec<String>,
    pub unknown: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Arity {
    Flag,
    Required,
    Optional,
}

fn arity(arg: &Arg) -> Arity {
    if !arg.get_action().takes_values() {
        return Arity::Flag;
    }
    match arg.get_num_args() {
        Some(range) if range.min_values() == 0 => Arity::Optional,
        _ => Arity::Required,
    }
}

fn find_long(command: &Command, name: &str) -> Option<Arity> {
    command
        .get_arguments()
        .find(|arg| {
            arg.get_long() == Some(name)
                || arg
                    .get_all_aliases()
                    .is_some_and(|aliases| aliases.contains(&name))
        })
        .map(arity)
}

fn find_short(command: &Command, c: char) -> Option<Arity> {
    command
        .get_arguments()
        .find(|arg| {
            arg.get_short() == Some(c)
                || arg
                    .get_all_short_aliases()
                    .is_some_and(|aliases| aliases.contains(&c))
        })
        .map(arity)
}

fn take_value<I: Iterator<Item = String>>(
    arity: Arity,
    args: &mut Peekable<I>,
    known: &mut Vec<String>,
) {
    match arity {
        Arity::Flag => {}
        Arity::Required => known.extend(args.next()),
        Arity::Optional => {
            if args.peek().is_some_and(|next| !next.starts_with('-')) {
                known.extend(args.next());
            }
        }
    }
}

/// Separate the arguments `command` defines from the rest, keeping the order
/// of each. The first element of `argv` is the program name.
pub fn split_known_args<I>(mut command: Command, argv: I) -> SplitArgs
where
    I: IntoIterator<Item = String>,
{
    command.build();
    let takes_positionals = command.get_positionals().next().is_some();

    let mut split = SplitArgs::default();
    let mut args = argv.into_iter();
    split.known.extend(args.next());
    let mut args = args.peekable();

    while let Some(token) = args.next() {
        if token == "--" {
            split.known.push(token);
            split.known.extend(args.by_ref());
            break;
        }

        if let Some(long) = token.strip_prefix("--") {
            let (name, inline_value) = match long.split_once('=') {
                Some((name, _)) => (name, true),
                None => (long, false),
            };
            match find_long(&command, name) {
                Some(arity) => {
                    split.known.push(token);
                    if !inline_value {
                        take_value(arity, &mut args, &mut split.known);
                    }
                }
                None => split.unknown.push(token),
            }
            continue;
        }

        if let Some(cluster) = token.strip_prefix('-').filter(|c| !c.is_empty()) {
            // -vv, -hu alice, -ualice
            let mut pending = None;
            let mut recognized = true;
            for (i, c) in cluster.char_indices() {
                match find_short(&command, c) {
                    Some(Arity::Flag) => {}
                    Some(arity) => {
                        if i + c.len_utf8() == cluster.len() {
                            pending = Some(arity);
                        }
                        break;
                    }
                    None => {
                        recognized = false;
                        break;
                    }
                }
            }
            if recognized {
                split.known.push(token);
                if let Some(arity) = pending {
                    take_value(arity, &mut args, &mut split.known);
                }
            } else {
                split.unknown.push(token);
            }
            continue;
        }

        if takes_positionals {
            split.known.push(token);
        } else {
            split.unknown.push(token);
        }
    }

    split
}
