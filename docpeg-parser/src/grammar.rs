//! The `AsciiDoc` rule set, expressed as compositions of [`Machine`]
//! combinators. Each rule is a plain function so rules can call each
//! other recursively without any registration step.
//!
//! Ordered choice encodes disambiguation policy: heading markers are
//! tried longest first so the longest valid prefix wins, and the
//! endline alternatives decide whether a newline is a soft wrap inside
//! running text or a structural boundary. Reordering alternatives
//! changes the language.

use crate::engine::{Halt, Machine, Step};
use crate::model::{
    Container, Document, Node, Paragraph, Simple, SimpleKind, Text, Title, TitleLevel,
};

/// Entry rule. Consumes the whole padded source and leaves exactly one
/// `Document` node on the stack.
///
/// Children are sections when a heading is present and bare blocks when
/// one is not, so a title-less document still parses. Trailing blank
/// lines (including the padding newlines) are consumed here so a fully
/// matched document always ends at end of input.
pub(crate) fn document(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| {
        m.push_node(Node::Document(Document::default()));
        m.zero_or_more(|m| {
            if m.attempt(section)? || m.attempt(block)? {
                m.add_as_child()?;
                return Ok(true);
            }
            Ok(false)
        })?;
        m.zero_or_more(blank_line)?;
        Ok(true)
    })
}

/// A title and the blocks under it. The blocks attach to the title
/// node, and the stamped span covers the whole section.
fn section(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| {
        if !title(m)? {
            return Ok(false);
        }
        m.optional(section_body)?;
        Ok(true)
    })
}

fn section_body(m: &mut Machine<'_>) -> Step {
    m.one_or_more(|m| {
        if !block(m)? {
            return Ok(false);
        }
        m.add_as_child()?;
        Ok(true)
    })
}

// ----- headings ---------------------------------------------------------

fn title(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| Ok(m.attempt(one_line_title)? || m.attempt(two_line_title)?))
}

fn one_line_title(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        if !one_line_title_start(m)? {
            return Ok(false);
        }
        sp(m)?;
        let any_inline = m.one_or_more(|m| {
            if !one_line_title_inline(m)? {
                return Ok(false);
            }
            m.add_as_child()?;
            Ok(true)
        })?;
        if !any_inline {
            return Ok(false);
        }
        // symmetric "= Title =" decoration, if present
        m.optional(|m| {
            sp(m)?;
            m.zero_or_more(|m| m.eat('='))?;
            sp(m)?;
            Ok(true)
        })?;
        newline(m)
    })
}

/// The longest run of 1 to 5 leading `=` chars; the run length is the
/// title level.
fn one_line_title_start(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        let from = m.pos();
        let matched = m.literal("=====")?
            || m.literal("====")?
            || m.literal("===")?
            || m.literal("==")?
            || m.literal("=")?;
        if !matched {
            return Ok(false);
        }
        let level = TitleLevel::try_from(m.pos() - from)
            .map_err(|_| Halt::Corrupted("heading marker length does not fit a title level"))?;
        let title =
            Title::new(level).map_err(|_| Halt::Corrupted("heading marker length outside 1..=5"))?;
        m.push_node(Node::Title(title));
        Ok(true)
    })
}

/// One inline unit of a one-line heading: anything short of the line's
/// end or the optional closing `=` decoration.
fn one_line_title_inline(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        if !m.test_not(newline)? {
            return Ok(false);
        }
        if !m.test_not(one_line_title_end)? {
            return Ok(false);
        }
        inline(m)
    })
}

// Only ever run under a lookahead; partial consumption is fine.
fn one_line_title_end(m: &mut Machine<'_>) -> Step {
    sp(m)?;
    m.zero_or_more(|m| m.eat('='))?;
    sp(m)?;
    newline(m)
}

/// Two-line form: a lookahead first confirms the text-plus-underline
/// shape with any of the five underline chars, then only the `=` and
/// `-` alternatives actually build a node. A `~`, `^` or `+` underline
/// passes the lookahead but consumes nothing, falling through to
/// paragraph handling.
fn two_line_title(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        if !m.test(two_line_title_shape)? {
            return Ok(false);
        }
        Ok(m.attempt(|m| two_line_title_level(m, 1, '='))?
            || m.attempt(|m| two_line_title_level(m, 2, '-'))?)
    })
}

fn two_line_title_shape(m: &mut Machine<'_>) -> Step {
    if !m.one_or_more(non_newline_char)? {
        return Ok(false);
    }
    if !newline(m)? {
        return Ok(false);
    }
    let underlined = m.n_or_more('=', 3)?
        || m.n_or_more('-', 3)?
        || m.n_or_more('~', 3)?
        || m.n_or_more('^', 3)?
        || m.n_or_more('+', 3)?;
    if !underlined {
        return Ok(false);
    }
    newline(m)
}

fn two_line_title_level(m: &mut Machine<'_>, level: TitleLevel, underline: char) -> Step {
    m.attempt(|m| {
        if !two_line_title_inline(m)? {
            return Ok(false);
        }
        let first = m.pop_node()?;
        let mut title =
            Title::new(level).map_err(|_| Halt::Corrupted("underline level outside 1..=5"))?;
        title.children.push(first);
        m.push_node(Node::Title(title));
        m.zero_or_more(|m| {
            if !two_line_title_inline(m)? {
                return Ok(false);
            }
            m.add_as_child()?;
            Ok(true)
        })?;
        if !newline(m)? {
            return Ok(false);
        }
        if !m.n_or_more(underline, 3)? {
            return Ok(false);
        }
        newline(m)
    })
}

fn two_line_title_inline(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        if !m.test_not(endline)? {
            return Ok(false);
        }
        inline(m)
    })
}

// ----- blocks -----------------------------------------------------------

fn block(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        m.zero_or_more(blank_line)?;
        Ok(m.attempt(para)? || m.attempt(inlines)?)
    })
}

/// A paragraph: optional sub-4-space indent, one inline run, then at
/// least one blank line (guaranteed for trailing paragraphs by the
/// two-newline padding).
fn para(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| {
        nonindent_space(m)?;
        if !inlines(m)? {
            return Ok(false);
        }
        let content = m.pop_node()?;
        let paragraph = Paragraph {
            children: vec![content],
            ..Paragraph::default()
        };
        m.push_node(Node::Paragraph(paragraph));
        m.one_or_more(blank_line)
    })
}

/// A run of inline units collected into one container. A newline joins
/// the run only when another inline follows it (soft wrap); one
/// trailing endline node is dropped so a closing newline is not
/// rendered as content.
fn inlines(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| {
        m.attempt(|m| {
            if !inline_or_soft_endline(m)? {
                return Ok(false);
            }
            let first = m.pop_node()?;
            let container = Container {
                children: vec![first],
                ..Container::default()
            };
            m.push_node(Node::Container(container));
            m.zero_or_more(|m| {
                if !inline_or_soft_endline(m)? {
                    return Ok(false);
                }
                m.add_as_child()?;
                Ok(true)
            })?;
            m.optional(|m| {
                if !endline(m)? {
                    return Ok(false);
                }
                m.drop_top()?;
                Ok(true)
            })?;
            Ok(true)
        })
    })
}

fn inline_or_soft_endline(m: &mut Machine<'_>) -> Step {
    if m.attempt(|m| {
        if !m.test_not(endline)? {
            return Ok(false);
        }
        inline(m)
    })? {
        return Ok(true);
    }
    m.attempt(|m| {
        if !endline(m)? {
            return Ok(false);
        }
        m.test(inline)
    })
}

/// Inline dispatch. The deadline check lives here so every atomic
/// inline unit pays it exactly once; a timeout raised here unwinds the
/// whole parse. New inline kinds (emphasis, links) slot in as
/// alternatives ahead of `word`.
fn inline(m: &mut Machine<'_>) -> Step {
    m.check_deadline()?;
    Ok(m.attempt(word)? || m.attempt(endline)? || m.attempt(space)?)
}

// ----- inline leaves ----------------------------------------------------

/// One or more non-space, non-newline chars as a single text leaf.
fn word(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| {
        let from = m.pos();
        if !m.one_or_more(normal_char)? {
            return Ok(false);
        }
        let text = m.matched_text(from);
        m.push_node(Node::Text(Text::new(text)));
        Ok(true)
    })
}

/// A run of spaces and tabs collapses to one literal space.
fn space(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| {
        if !m.one_or_more(|m| m.any_of(" \t"))? {
            return Ok(false);
        }
        m.push_node(Node::Text(Text::new(" ")));
        Ok(true)
    })
}

fn endline(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| {
        Ok(m.attempt(line_break)? || m.attempt(terminal_endline)? || m.attempt(normal_endline)?)
    })
}

/// Two trailing spaces before a soft newline force an explicit break
/// node in place of the newline text.
fn line_break(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        if !m.literal("  ")? {
            return Ok(false);
        }
        if !normal_endline(m)? {
            return Ok(false);
        }
        m.poke(Node::Simple(Simple::new(SimpleKind::Linebreak)))?;
        Ok(true)
    })
}

/// The very last newline of the input, kept as literal text.
fn terminal_endline(m: &mut Machine<'_>) -> Step {
    m.node_seq(|m| {
        sp(m)?;
        if !newline(m)? {
            return Ok(false);
        }
        if !m.at_end() {
            return Ok(false);
        }
        m.push_node(Node::Text(Text::new("\n")));
        Ok(true)
    })
}

/// A soft wrap: a newline not followed by anything that opens a new
/// block or section. The lookahead set is the whole soft-wrap policy.
fn normal_endline(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        sp(m)?;
        if !newline(m)? {
            return Ok(false);
        }
        if !m.test_not(structural_boundary)? {
            return Ok(false);
        }
        m.push_node(Node::Text(Text::new("\n")));
        Ok(true)
    })
}

// Only ever run under a lookahead; partial consumption is fine.
fn structural_boundary(m: &mut Machine<'_>) -> Step {
    if m.attempt(blank_line)? {
        return Ok(true);
    }
    // quote marker
    if m.eat('>')? {
        return Ok(true);
    }
    if m.attempt(one_line_title_start)? {
        return Ok(true);
    }
    m.attempt(|m| {
        m.zero_or_more(non_newline_char)?;
        if !newline(m)? {
            return Ok(false);
        }
        if !(m.n_or_more('=', 3)? || m.n_or_more('-', 3)?) {
            return Ok(false);
        }
        newline(m)
    })
}

// ----- lines and basics -------------------------------------------------

fn blank_line(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        sp(m)?;
        newline(m)
    })
}

fn newline(m: &mut Machine<'_>) -> Step {
    if m.eat('\n')? {
        return Ok(true);
    }
    m.attempt(|m| {
        if !m.eat('\r')? {
            return Ok(false);
        }
        m.optional(|m| m.eat('\n'))?;
        Ok(true)
    })
}

/// Zero or more spaces and tabs. Always succeeds.
fn sp(m: &mut Machine<'_>) -> Step {
    m.zero_or_more(|m| m.any_of(" \t"))
}

fn normal_char(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        if !m.test_not(|m| m.any_of(" \t"))? {
            return Ok(false);
        }
        if !m.test_not(|m| m.any_of("\n\r"))? {
            return Ok(false);
        }
        m.any_char()
    })
}

fn non_newline_char(m: &mut Machine<'_>) -> Step {
    m.attempt(|m| {
        if !m.test_not(|m| m.any_of("\n\r"))? {
            return Ok(false);
        }
        m.any_char()
    })
}

/// Up to three leading spaces, not enough to start an indented block.
fn nonindent_space(m: &mut Machine<'_>) -> Step {
    m.optional(|m| Ok(m.literal("   ")? || m.literal("  ")? || m.literal(" ")?))
}

/// One indentation step. Reserved for indented blocks (literal blocks,
/// nested list content); no current rule consumes it.
#[allow(dead_code)]
fn indent(m: &mut Machine<'_>) -> Step {
    Ok(m.eat('\t')? || m.literal("    ")?)
}
