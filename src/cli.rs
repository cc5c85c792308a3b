//! Command-line argument parsing

use std::path::PathBuf;

use crate::app::AppError;

pub const USAGE: &str = "usage: capability-evidence [-h] [--pdf_path PDF_PATH]

Process PDF evaluation documents

options:
  -h, --help             show this help message and exit
  --pdf_path PDF_PATH    Path to the PDF evaluation document";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Path to the PDF evaluation document
    pub pdf_path: Option<PathBuf>,
    pub help: bool,
}

impl CliArgs {
    /// Parse the process arguments
    pub fn from_env() -> Result<Self, AppError> {
        Self::parse(std::env::args().skip(1))
    }

    /// Parse arguments, excluding the program name
    pub fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--pdf_path" => {
                    let value = args.next().ok_or_else(|| {
                        AppError::InvalidArgument("--pdf_path expects one argument".to_string())
                    })?;
                    parsed.pdf_path = Some(PathBuf::from(value));
                }
                other => {
                    if let Some(value) = other.strip_prefix("--pdf_path=") {
                        parsed.pdf_path = Some(PathBuf::from(value));
                    } else {
                        return Err(AppError::InvalidArgument(format!(
                            "unrecognized argument '{other}'"
                        )));
                    }
                }
            }
        }

        Ok(parsed)
    }
}
