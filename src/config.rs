//! Command-line configuration: which image file(s) to load and run.

use clap::{App, Arg};

/// Parsed CLI arguments. One or more image files, loaded in order onto a
/// single `Machine` before execution starts.
#[derive(Debug, PartialEq)]
pub struct Config {
    pub image_files: Vec<String>,
}

impl Config {
    /// Parses `args` (as `std::env::args().collect::<Vec<_>>()` would
    /// produce, argv[0] included). Returns `Err` with a usage message on
    /// missing arguments — the caller maps that to the CLI's usage exit
    /// code.
    pub fn with(args: &[String]) -> Result<Self, String> {
        let matches = App::new("lc3")
            .about("A user-space LC-3 instruction set emulator")
            .arg(
                Arg::with_name("IMAGE")
                    .help("LC-3 object image file(s) to load and run")
                    .required(true)
                    .multiple(true)
                    .index(1),
            )
            .get_matches_from_safe(args)
            .map_err(|e| e.message)?;

        let image_files = matches
            .values_of("IMAGE")
            .expect("IMAGE is required")
            .map(String::from)
            .collect();

        Ok(Config { image_files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rest: &[&str]) -> Vec<String> {
        std::iter::once("lc3")
            .chain(rest.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn single_image_file() {
        let config = Config::with(&args(&["program.obj"])).unwrap();

        assert_eq!(config.image_files, vec!["program.obj".to_string()]);
    }

    #[test]
    fn multiple_image_files_preserve_order() {
        let config = Config::with(&args(&["a.obj", "b.obj"])).unwrap();

        assert_eq!(
            config.image_files,
            vec!["a.obj".to_string(), "b.obj".to_string()]
        );
    }

    #[test]
    fn missing_argument_is_an_error() {
        assert!(Config::with(&args(&[])).is_err());
    }
}
