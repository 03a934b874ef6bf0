mod base;
mod interface;
mod middleware;
mod printer;

pub use self::base::{ConfigError, ParseError};
pub(crate) use self::base::Parser;
pub use self::interface::{ConsoleInterface, UserInterface};
pub(crate) use self::interface::{ColumnRenderer, LeftWidth, MiddleWidth, PaddingWidth, TotalWidth};
pub use self::middleware::{GeneralParser, ParseExit};
pub use self::printer::ErrorContext;
pub(crate) use self::printer::Printer;

#[cfg(any(test, feature = "unit_test"))]
pub use self::interface::InMemoryInterface;
