//! Plain-text help rendering.
//!
//! Rendered from the same [`CommandSpec`] the engine parses against, so
//! help always reflects exactly what the parser accepts: a usage line, the
//! built-in `--help` entry, one titled section per option group, and a
//! command list per subcommand group.

use crate::engine::{Arity, CommandSpec, OptionDecl, OptionGroup, SubparserGroup};

/// Column where help text starts when the invocation fits before it.
const HELP_COLUMN: usize = 24;

/// Render the full help text, wrapping at `width` columns.
pub fn render(spec: &CommandSpec, width: usize) -> String {
    let mut out = String::new();
    out.push_str(&usage_line(spec));
    out.push('\n');

    if let Some(description) = &spec.description {
        out.push('\n');
        for line in wrap(description, width) {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out.push_str("\noptions:\n");
    push_entry(
        &mut out,
        "  -h, --help",
        Some("show this help message and exit"),
        width,
    );

    for group in &spec.groups {
        render_group(&mut out, group, width);
    }
    for subparser in &spec.subparsers {
        render_subparser(&mut out, subparser, width);
    }
    out
}

fn usage_line(spec: &CommandSpec) -> String {
    let mut line = format!("usage: {} [-h]", spec.prog);
    for group in &spec.groups {
        for decl in &group.options {
            line.push(' ');
            if decl.required {
                line.push_str(&invocation(decl));
            } else {
                line.push('[');
                line.push_str(&invocation(decl));
                line.push(']');
            }
        }
    }
    for subparser in &spec.subparsers {
        let summary = format!("{{{}}} ...", subparser.command_names().join(","));
        line.push(' ');
        if subparser.required {
            line.push_str(&summary);
        } else {
            line.push('[');
            line.push_str(&summary);
            line.push(']');
        }
    }
    line
}

/// The flag-plus-metavar form shown in usage and section entries.
fn invocation(decl: &OptionDecl) -> String {
    let metavar = decl.parser.metavar();
    match decl.arity {
        Arity::ExactlyOne => format!("{} {metavar}", decl.flag),
        Arity::ZeroOrOne => format!("{} [{metavar}]", decl.flag),
        Arity::ZeroOrMore => format!("{} [{metavar} ...]", decl.flag),
        Arity::OneOrMore => format!("{} {metavar} [{metavar} ...]", decl.flag),
    }
}

fn render_group(out: &mut String, group: &OptionGroup, width: usize) {
    if group.options.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(&group.title);
    out.push_str(":\n");
    if let Some(description) = &group.description {
        for line in wrap(description, width.saturating_sub(2)) {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    for decl in &group.options {
        push_entry(
            out,
            &format!("  {}", invocation(decl)),
            entry_help(decl).as_deref(),
            width,
        );
    }
}

fn render_subparser(out: &mut String, subparser: &SubparserGroup, width: usize) {
    out.push_str("\ncommands:\n");
    push_entry(
        out,
        &format!("  {{{}}}", subparser.command_names().join(",")),
        subparser.help.as_deref(),
        width,
    );
    for command in &subparser.commands {
        push_entry(
            out,
            &format!("    {}", command.name),
            command.help.as_deref(),
            width,
        );
    }
    for command in &subparser.commands {
        for group in &command.groups {
            render_group(out, group, width);
        }
    }
}

/// Help line for one option, with its default or required marker appended.
fn entry_help(decl: &OptionDecl) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(help) = &decl.help {
        parts.push(help.clone());
    }
    if decl.required {
        parts.push("(required)".to_string());
    } else if let Some(default) = &decl.default {
        parts.push(format!("(default: {default})"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Two-column entry: the invocation, then help text starting at
/// [`HELP_COLUMN`] (or on the next line when the invocation is too wide).
fn push_entry(out: &mut String, invocation: &str, help: Option<&str>, width: usize) {
    out.push_str(invocation);
    let Some(help) = help else {
        out.push('\n');
        return;
    };
    let lines = wrap(help, width.saturating_sub(HELP_COLUMN));
    let mut first = true;
    if invocation.len() + 2 <= HELP_COLUMN {
        if let Some(line) = lines.first() {
            for _ in invocation.len()..HELP_COLUMN {
                out.push(' ');
            }
            out.push_str(line);
            first = false;
        }
    }
    out.push('\n');
    for line in lines.iter().skip(if first { 0 } else { 1 }) {
        for _ in 0..HELP_COLUMN {
            out.push(' ');
        }
        out.push_str(line);
        out.push('\n');
    }
}

/// Greedy word wrap, preserving explicit newlines.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(16);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}
