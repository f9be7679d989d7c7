use std::time::Duration;

use docpeg_converters_html::{render, to_html};
use docpeg_parser::{Container, Document, Location, Node, Options, Text};

type Error = Box<dyn std::error::Error>;

fn html(input: &str) -> Result<String, Error> {
    to_html(input, &Options::default())?.ok_or_else(|| "unexpected timeout".into())
}

#[rstest::rstest]
#[case::one_line_level1("= My Title", "<h1>My Title</h1>")]
#[case::one_line_level2("== My Title", "<h2>My Title</h2>")]
#[case::one_line_level3("=== My Title", "<h3>My Title</h3>")]
#[case::one_line_level4("==== My Title", "<h4>My Title</h4>")]
#[case::one_line_level5("===== My Title", "<h5>My Title</h5>")]
#[case::trailing_space_trimmed("== My Title ", "<h2>My Title</h2>")]
#[case::symmetric_decoration("= My Title =", "<h1>My Title</h1>")]
#[tracing_test::traced_test]
fn one_line_titles(#[case] input: &str, #[case] expected: &str) -> Result<(), Error> {
    pretty_assertions::assert_eq!(html(input)?, expected);
    Ok(())
}

#[rstest::rstest]
#[case::exactly_three("===")]
#[case::four("====")]
#[case::five("=====")]
#[case::six("======")]
#[case::seven("=======")]
#[case::longer_than_the_text("===========")]
fn two_line_title_underline_length_is_uniform(#[case] underline: &str) -> Result<(), Error> {
    let with_newline = format!("My Title\n{underline}\n");
    let without_newline = format!("My Title\n{underline}");
    pretty_assertions::assert_eq!(html(&with_newline)?, "<h1>My Title</h1>");
    pretty_assertions::assert_eq!(html(&without_newline)?, "<h1>My Title</h1>");
    Ok(())
}

#[test]
fn dash_underline_renders_level_two() -> Result<(), Error> {
    pretty_assertions::assert_eq!(html("My Title\n--------")?, "<h2>My Title</h2>");
    Ok(())
}

#[rstest::rstest]
#[case::one_equals("My Title\n=", "<p>My Title</p><p>=</p>")]
#[case::two_equals("My Title\n==", "<p>My Title</p><p>==</p>")]
#[case::two_dashes("My Title\n--", "<p>My Title\n--</p>")]
fn short_underlines_fall_through_to_paragraphs(
    #[case] input: &str,
    #[case] expected: &str,
) -> Result<(), Error> {
    let output = html(input)?;
    assert!(!output.contains("<h1>"), "no heading expected in {output:?}");
    pretty_assertions::assert_eq!(output, expected);
    Ok(())
}

#[test]
fn soft_wrapped_paragraph_stays_one_p() -> Result<(), Error> {
    let output = html("line one\nline two\n\n")?;
    pretty_assertions::assert_eq!(output, "<p>line one\nline two</p>");
    assert!(!output.contains("<br/>"));
    Ok(())
}

#[test]
fn two_trailing_spaces_render_an_explicit_break() -> Result<(), Error> {
    pretty_assertions::assert_eq!(html("first  \nsecond")?, "<p>first<br/>second</p>");
    Ok(())
}

#[test]
fn consecutive_paragraphs_render_separately() -> Result<(), Error> {
    pretty_assertions::assert_eq!(html("one\n\ntwo\n\n")?, "<p>one</p><p>two</p>");
    Ok(())
}

#[test]
fn section_body_renders_inside_its_heading() -> Result<(), Error> {
    // Blocks attach to the title node, so the body renders inside the
    // heading tag. Documented behavior, not a guaranteed contract.
    pretty_assertions::assert_eq!(
        html("== Topic\n\nbody text\n")?,
        "<h2>Topic<p>body text</p></h2>"
    );
    Ok(())
}

#[test]
fn text_content_is_html_escaped() -> Result<(), Error> {
    pretty_assertions::assert_eq!(
        html("a <b> & \"q\"")?,
        "<p>a &lt;b&gt; &amp; &quot;q&quot;</p>"
    );
    Ok(())
}

#[test]
fn space_runs_collapse_to_one_space() -> Result<(), Error> {
    pretty_assertions::assert_eq!(html("a \t  b")?, "<p>a b</p>");
    Ok(())
}

#[test]
fn empty_input_renders_nothing() -> Result<(), Error> {
    pretty_assertions::assert_eq!(html("")?, "");
    Ok(())
}

#[test]
fn rendering_is_idempotent() -> Result<(), Error> {
    let document = docpeg_parser::parse("= Title\n\nbody one\nbody two\n\n", &Options::default())?;
    let first = render(&document)?;
    let second = render(&document)?;
    pretty_assertions::assert_eq!(first, second);
    Ok(())
}

#[tracing_test::traced_test]
#[test]
fn tiny_budget_times_out_without_crashing() -> Result<(), Error> {
    let input = "a paragraph line\n".repeat(500);
    let outcome = to_html(&input, &Options::new(Duration::ZERO))?;
    pretty_assertions::assert_eq!(outcome, None);
    Ok(())
}

// A bare inline run at block level stays unwrapped; pinned as the
// current behavior of the fallback block alternative.
#[test]
fn unwrapped_container_at_top_level_renders_without_a_tag() -> Result<(), Error> {
    let container = Container {
        children: vec![Node::Text(Text::new("bare inline run"))],
        location: Location::default(),
    };
    let document = Document {
        children: vec![Node::Container(container)],
        location: Location::default(),
    };
    pretty_assertions::assert_eq!(render(&document)?, "bare inline run");
    Ok(())
}
