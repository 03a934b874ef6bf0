use crate::parser::{ErrorContext, ParseError};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug)]
pub(crate) struct PaddingWidth(usize);

impl PaddingWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // padding must be at least 1
        if width >= 1 {
            Ok(PaddingWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct LeftWidth(usize);

impl LeftWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // left must be at least 1
        if width >= 1 {
            Ok(LeftWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct MiddleWidth(usize);

impl MiddleWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // middle must be at least 2 (so we can hyphenate)
        if width >= 2 {
            Ok(MiddleWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TotalWidth(pub usize);

/// Lays out the help entries as `INVOCATION    HELP`, wrapping the help column.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

impl ColumnRenderer {
    /// Produce a renderer based off the provided widths.
    /// This renderer will use a heuristic to chose the middle width.
    pub(crate) fn guided(
        padding: PaddingWidth,
        left: LeftWidth,
        middle: MiddleWidth,
        total_width: TotalWidth,
    ) -> Self {
        let non_middle: usize = left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle.0, MINIMUM_MIDDLE_WIDTH);

        if guided_middle + non_middle <= target_total_width {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} and middle fit within the target total {target_total_width}.  Selecting middle: {guided_middle}.");
            }

            Self::new(padding, left, MiddleWidth(guided_middle))
        } else if non_middle < total_width.0 {
            let calculated_middle =
                std::cmp::max(total_width.0 - non_middle, MINIMUM_MIDDLE_WIDTH);
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} fit within the total {}.  Selecting middle: {calculated_middle}.", total_width.0);
            }

            Self::new(padding, left, MiddleWidth(calculated_middle))
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} do not fit within the total {}.  Selecting middle: {MINIMUM_MIDDLE_WIDTH}.", total_width.0);
            }

            Self::new(padding, left, MiddleWidth(MINIMUM_MIDDLE_WIDTH))
        }
    }

    /// Produce a renderer based off the provided widths.
    pub(crate) fn new(padding: PaddingWidth, left: LeftWidth, middle: MiddleWidth) -> Self {
        Self {
            padding,
            left,
            middle,
        }
    }

    pub(crate) fn left_width(&self) -> usize {
        self.left.0
    }

    /// Render a left entry (which must fit the left column) with its wrapped middle text.
    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let padding = self.padding.0;
        let padding = format!("{:padding$}", "");
        let left_column_width = self.left.0;
        assert!(left.chars().count() <= left_column_width);
        let middle_column_width = std::cmp::max(self.middle.0.saturating_sub(indent), 2);
        let middle_parts = chunk(middle, middle_column_width);
        let mut out = Vec::default();

        for (i, part) in middle_parts.iter().enumerate() {
            if i == 0 {
                out.push(format!(
                    "{:indent$}{:left_column_width$}{padding}{}",
                    "", left, part
                ));
            } else {
                out.push(format!(
                    "{:indent$}{:left_column_width$}{padding}{}",
                    "", "", part
                ));
            }
        }

        if out.is_empty() {
            out.push(format!("{:indent$}{}", "", left));
        }

        out
    }
}

/// Break a paragraph into lines of at most `width`, hyphenating the words that don't fit a line.
pub(crate) fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.chars().count() + word.chars().count() < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = String::default();
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let increment = width - 1;
    let characters: Vec<char> = word.chars().collect();
    let mut left = 0;

    while left + increment + 1 < characters.len() {
        let piece: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{piece}-"));
        left += increment;
    }

    current.extend(&characters[left..]);
}

/// The output channel of the [`GeneralParser`](crate::GeneralParser).
pub trait UserInterface {
    /// Print a standard message (help or version).
    fn print(&self, message: String);

    /// Print a parse error.
    fn print_error(&self, error: &ParseError);

    /// Print where, on the command line, the parse error occurred.
    fn print_error_context(&self, error_context: ErrorContext);
}

/// Prints messages on stdout, and errors on stderr.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: &ParseError) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}

#[cfg(any(test, feature = "unit_test"))]
mod in_memory {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Captured {
        message: Option<Vec<String>>,
        error: Option<String>,
        error_context: Option<ErrorContext>,
    }

    /// Captures the output in memory; clones share the same capture.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryInterface {
        captured: Rc<RefCell<Captured>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            // Allows for print() to be called many times, concatenating the messages.
            self.captured
                .borrow_mut()
                .message
                .get_or_insert_with(Vec::default)
                .push(message);
        }

        fn print_error(&self, error: &ParseError) {
            // Assumes print_error() is only ever called once.
            self.captured.borrow_mut().error.replace(error.to_string());
        }

        fn print_error_context(&self, error_context: ErrorContext) {
            self.captured
                .borrow_mut()
                .error_context
                .replace(error_context);
        }
    }

    impl InMemoryInterface {
        /// The printed messages, joined by newlines.
        pub fn message(&self) -> Option<String> {
            self.captured
                .borrow()
                .message
                .as_ref()
                .map(|messages| messages.join("\n"))
        }

        /// The printed error.
        pub fn error(&self) -> Option<String> {
            self.captured.borrow().error.clone()
        }

        /// The printed error context.
        pub fn error_context(&self) -> Option<ErrorContext> {
            self.captured.borrow().error_context.clone()
        }
    }
}

#[cfg(any(test, feature = "unit_test"))]
pub use in_memory::InMemoryInterface;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn column_renderer_simple() {
        let cr = ColumnRenderer::new(
            PaddingWidth::new(4).unwrap(),
            LeftWidth::new(5).unwrap(),
            MiddleWidth::new(23).unwrap(),
        );

        assert_eq!(
            cr.render(0, "abc", "something"),
            vec!["abc      something".to_string()]
        );
        assert_eq!(
            cr.render(0, "abc", "  something  "),
            vec!["abc      something".to_string()]
        );
        assert_eq!(
            cr.render(0, "abc12", "something pieces full"),
            vec!["abc12    something pieces full".to_string()]
        );
        assert_eq!(
            cr.render(0, "abc", "something pieces full more stuff"),
            vec![
                "abc      something pieces full".to_string(),
                "         more stuff".to_string(),
            ]
        );
        assert_eq!(
            cr.render(0, "abc", "something pieces fullest more stuff extra     "),
            vec![
                "abc      something pieces".to_string(),
                "         fullest more stuff".to_string(),
                "         extra".to_string(),
            ]
        );
    }

    #[test]
    fn column_renderer_indent() {
        let cr = ColumnRenderer::new(
            PaddingWidth::new(2).unwrap(),
            LeftWidth::new(4).unwrap(),
            MiddleWidth::new(12).unwrap(),
        );

        assert_eq!(
            cr.render(2, "-a", "one two three"),
            vec!["  -a    one two".to_string(), "        three".to_string()]
        );
        assert_eq!(cr.render(2, "-a", ""), vec!["  -a".to_string()]);
    }

    #[rstest]
    #[case("", 5, vec![])]
    #[case("a b c", 5, vec!["a b c"])]
    #[case("a b cd", 5, vec!["a b", "cd"])]
    #[case("abcdef", 4, vec!["abc-", "def"])]
    #[case("abcdefg", 4, vec!["abc-", "defg"])]
    #[case("x abcdefghi", 4, vec!["x", "abc-", "def-", "ghi"])]
    fn chunk_paragraph(#[case] paragraph: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(chunk(paragraph, width), expected);
    }

    #[rstest]
    #[case(80, 30)]
    #[case(40, 21)]
    #[case(10, MINIMUM_MIDDLE_WIDTH)]
    fn column_renderer_guided(#[case] total: usize, #[case] expected: usize) {
        let cr = ColumnRenderer::guided(
            PaddingWidth::new(2).unwrap(),
            LeftWidth::new(17).unwrap(),
            MiddleWidth::new(30).unwrap(),
            TotalWidth(total),
        );
        assert_eq!(cr.middle.0, expected);
    }

    #[test]
    fn in_memory_shared() {
        let interface = InMemoryInterface::default();
        let clone = interface.clone();
        clone.print("a".to_string());
        clone.print("b".to_string());
        clone.print_error(&ParseError("oops".to_string()));

        assert_eq!(interface.message(), Some("a\nb".to_string()));
        assert_eq!(interface.error(), Some("error: oops".to_string()));
        assert_eq!(interface.error_context(), None);
    }
}
