//! One `Render` impl per node variant. The tree is assumed well formed;
//! a node or symbolic kind the converter does not recognize is an
//! internal-consistency error, never a property of user input.

use std::io::Write;

use docpeg_parser::{Container, Document, Node, Paragraph, Simple, SimpleKind, Text, Title};

use crate::{Error, escape::escape_html};

pub(crate) trait Render {
    fn render<W: Write>(&self, w: &mut W) -> Result<(), Error>;
}

fn render_children<W: Write>(children: &[Node], w: &mut W) -> Result<(), Error> {
    for child in children {
        child.render(w)?;
    }
    Ok(())
}

impl Render for Document {
    fn render<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        render_children(&self.children, w)
    }
}

impl Render for Node {
    fn render<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        match self {
            Node::Document(document) => document.render(w),
            Node::Title(title) => title.render(w),
            Node::Paragraph(paragraph) => paragraph.render(w),
            Node::Container(container) => container.render(w),
            Node::Text(text) => text.render(w),
            Node::Simple(simple) => simple.render(w),
            #[allow(clippy::wildcard_enum_match_arm)]
            unknown => Err(Error::UnexpectedNode(format!("{unknown:?}"))),
        }
    }
}

impl Render for Title {
    fn render<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        write!(w, "<h{}>", self.level)?;
        render_children(&self.children, w)?;
        write!(w, "</h{}>", self.level)?;
        Ok(())
    }
}

impl Render for Paragraph {
    fn render<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(b"<p>")?;
        render_children(&self.children, w)?;
        w.write_all(b"</p>")?;
        Ok(())
    }
}

// No tag of its own; the grouping is invisible in the output.
impl Render for Container {
    fn render<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        render_children(&self.children, w)
    }
}

impl Render for Text {
    fn render<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(escape_html(&self.content).as_bytes())?;
        Ok(())
    }
}

impl Render for Simple {
    fn render<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        let literal = match self.kind {
            SimpleKind::Apostrophe => "&rsquo;",
            SimpleKind::Ellipsis => "&hellip;",
            SimpleKind::Emdash => "&mdash;",
            SimpleKind::Endash => "&ndash;",
            SimpleKind::HRule => "\n<hr/>",
            SimpleKind::Linebreak => "<br/>",
            SimpleKind::Nbsp => "&nbsp;",
            #[allow(clippy::wildcard_enum_match_arm)]
            unknown => return Err(Error::UnexpectedNode(format!("{unknown:?}"))),
        };
        w.write_all(literal.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use docpeg_parser::Location;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn render_to_string(node: &Node) -> String {
        let mut out = Vec::new();
        node.render(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[rstest]
    #[case(SimpleKind::Apostrophe, "&rsquo;")]
    #[case(SimpleKind::Ellipsis, "&hellip;")]
    #[case(SimpleKind::Emdash, "&mdash;")]
    #[case(SimpleKind::Endash, "&ndash;")]
    #[case(SimpleKind::HRule, "\n<hr/>")]
    #[case(SimpleKind::Linebreak, "<br/>")]
    #[case(SimpleKind::Nbsp, "&nbsp;")]
    fn simple_kinds_render_fixed_literals(#[case] kind: SimpleKind, #[case] expected: &str) {
        let node = Node::Simple(Simple::new(kind));
        assert_eq!(render_to_string(&node), expected);
    }

    #[test]
    fn container_renders_children_without_a_tag() {
        let container = Container {
            children: vec![
                Node::Text(Text::new("a")),
                Node::Simple(Simple::new(SimpleKind::Linebreak)),
                Node::Text(Text::new("b")),
            ],
            location: Location::default(),
        };
        assert_eq!(render_to_string(&Node::Container(container)), "a<br/>b");
    }

    #[test]
    fn text_is_escaped() {
        let node = Node::Text(Text::new("2 < 3 && \"x\""));
        assert_eq!(render_to_string(&node), "2 &lt; 3 &amp;&amp; &quot;x&quot;");
    }
}
