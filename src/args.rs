use std::env;
use std::path::PathBuf;

/// Where frames come from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Cycle through the images of a directory, clicks are only logged
    Replay(PathBuf),
    /// Live screen capture and real mouse clicks
    Desktop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub templates_dir: PathBuf,
    pub source: Source,
    pub config_file: Option<PathBuf>,
    pub preset: String,
    pub debug_mode: bool,
    pub timeout_secs: Option<u64>,
}

/// What the command line asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help,
    Version,
}

impl Args {
    /// Parse the process arguments. Prints help, version or the parse error
    /// and returns `None` when there is nothing to run.
    pub fn parse() -> Option<Self> {
        match Self::parse_from(env::args().skip(1)) {
            Ok(Parsed::Run(args)) => Some(args),
            Ok(Parsed::Help) => {
                print_help();
                None
            }
            Ok(Parsed::Version) => {
                println!(
                    "Auto Clicker v{} (built {})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                None
            }
            Err(message) => {
                eprintln!("❌ {}", message);
                print_help();
                None
            }
        }
    }

    /// Parse flags, program name already stripped
    pub fn parse_from<I, S>(args: I) -> Result<Parsed, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut templates_dir = PathBuf::from("images");
        let mut replay_dir: Option<PathBuf> = None;
        let mut config_file: Option<PathBuf> = None;
        let mut preset = "default".to_string();
        let mut debug_mode = false;
        let mut timeout_secs: Option<u64> = None;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                return Ok(Parsed::Help);
            } else if arg == "--version" || arg == "-v" {
                return Ok(Parsed::Version);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if let Some(val) = arg.strip_prefix("--templates=") {
                templates_dir = PathBuf::from(non_empty("--templates", val)?);
            } else if let Some(val) = arg.strip_prefix("--replay=") {
                replay_dir = Some(PathBuf::from(non_empty("--replay", val)?));
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config_file = Some(PathBuf::from(non_empty("--config", val)?));
            } else if let Some(val) = arg.strip_prefix("--preset=") {
                match val {
                    "default" | "strict" | "lenient" => preset = val.to_string(),
                    other => {
                        return Err(format!(
                            "Unknown preset '{}', expected default, strict or lenient",
                            other
                        ));
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<u64>() {
                    Ok(secs) => timeout_secs = Some(secs),
                    Err(_) => return Err(format!("Invalid timeout value: {}", val)),
                }
            } else {
                return Err(format!("Unknown argument: {}", arg));
            }
        }

        Ok(Parsed::Run(Args {
            templates_dir,
            source: replay_dir.map_or(Source::Desktop, Source::Replay),
            config_file,
            preset,
            debug_mode,
            timeout_secs,
        }))
    }
}

fn non_empty<'a>(flag: &str, value: &'a str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("{} needs a value", flag))
    } else {
        Ok(value)
    }
}

fn print_help() {
    println!("🖱️ Auto Clicker - clicks wherever a template image shows up on screen");
    println!();
    println!("USAGE:");
    println!("    auto-clicker [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --templates=DIR     Template PNG directory (default: images)");
    println!("    --replay=DIR        Scan the images in DIR instead of the screen, log clicks only");
    println!("    --config=FILE       Load detection settings from a TOML file");
    println!("    --preset=NAME       Built-in settings: default, strict or lenient");
    println!("    --debug             Enable debug logging");
    println!("    --timeout=N         Stop after N seconds");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("Live screen capture needs a build with the 'desktop' feature.");
    println!();
    println!("EXAMPLES:");
    println!("    auto-clicker --templates=images");
    println!("    auto-clicker --replay=frames --timeout=10 --debug");
    println!("    auto-clicker --preset=strict --config=clicker.toml");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Args {
        match Args::parse_from(args) {
            Ok(Parsed::Run(args)) => args,
            other => panic!("expected run args, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let args = run(&[]);
        assert_eq!(args.templates_dir, PathBuf::from("images"));
        assert_eq!(args.source, Source::Desktop);
        assert_eq!(args.preset, "default");
        assert!(!args.debug_mode);
        assert_eq!(args.timeout_secs, None);
        assert_eq!(args.config_file, None);
    }

    #[test]
    fn test_all_flags() {
        let args = run(&[
            "--templates=tpl",
            "--replay=frames",
            "--config=clicker.toml",
            "--preset=lenient",
            "--timeout=30",
            "--debug",
        ]);
        assert_eq!(args.templates_dir, PathBuf::from("tpl"));
        assert_eq!(args.source, Source::Replay(PathBuf::from("frames")));
        assert_eq!(args.config_file, Some(PathBuf::from("clicker.toml")));
        assert_eq!(args.preset, "lenient");
        assert_eq!(args.timeout_secs, Some(30));
        assert!(args.debug_mode);
    }

    #[test]
    fn test_help_and_version_win() {
        assert_eq!(Args::parse_from(["--debug", "-h"]), Ok(Parsed::Help));
        assert_eq!(Args::parse_from(["--version", "--bogus"]), Ok(Parsed::Version));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Args::parse_from(["--timeout=soon"]).is_err());
        assert!(Args::parse_from(["--preset=turbo"]).is_err());
        assert!(Args::parse_from(["--replay="]).is_err());
        assert!(Args::parse_from(["--gui"]).is_err());
    }
}
