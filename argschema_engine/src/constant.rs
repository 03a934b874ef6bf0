pub(crate) const HELP_NAME: &str = "--help";
pub(crate) const HELP_SHORT: &str = "-h";
pub(crate) const HELP_MESSAGE: &str = "show this help message and exit";

pub(crate) const POSITIONAL_TITLE: &str = "positional arguments";
pub(crate) const OPTIONS_TITLE: &str = "options";

// argparse substitutes this placeholder in version strings.
pub(crate) const PROGRAM_PLACEHOLDER: &str = "%(prog)s";
