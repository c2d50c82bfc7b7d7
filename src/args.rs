//! # Argument Module
//!
//! Command line parsing for mdv. Parsing never fails: unknown flags are
//! skipped so the window always opens with *something* to show.

use std::env;

/// Parsed command line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    /// Markdown file to open. The last non-flag argument wins.
    pub file: Option<String>,
    /// Open the document in the system browser instead of in-app.
    pub browser: bool,
    /// Start in fullscreen.
    pub fullscreen: bool,
}

impl Args {
    /// Parses an argument list whose first element is the program name.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::default();

        for arg in args.into_iter().skip(1) {
            match arg.as_ref() {
                "--browser" | "-b" => parsed.browser = true,
                "--app" | "-a" => parsed.browser = false,
                "--fullscreen" | "-f" => parsed.fullscreen = true,
                other if !other.starts_with('-') => parsed.file = Some(other.to_string()),
                other => log::debug!("ignoring unknown flag {other}"),
            }
        }

        parsed
    }

    /// Parses the arguments of the current process.
    pub fn from_env() -> Self {
        Self::parse(env::args())
    }
}

/// Usage document shown when no file is given and no `usage.md` is bundled.
pub const USAGE: &str = r#"# Markdown Viewer

## Usage

```
mdv <file.md> [options]
```

If the file does not exist, `mdv` also tries the same name with `.md` appended,
so `mdv notes` opens `notes.md`.

## Options

- `--browser` or `-b`: Open in browser mode
- `--app` or `-a`: Open in app mode (default)
- `--fullscreen` or `-f`: Start in fullscreen mode

Unknown options are ignored.

## Keyboard Shortcuts

- **ESC**: Quit (or exit fullscreen)
- **Ctrl+B**: Toggle between app and browser mode
- **F11**: Toggle fullscreen mode
- **Ctrl+C**: Copy as plain text
- **Ctrl+Shift+C**: Copy as rich text
- **Ctrl+Alt+C**: Copy as HTML
- **Ctrl+M**: Copy as markdown
- **Ctrl+O**: Open another file
- **F5**: Reload the current file
- **Ctrl+=** / **Ctrl+-**: Larger / smaller text

## Examples

```
mdv README.md
mdv doc.md --browser
mdv notes.md -b
mdv presentation.md --fullscreen
```
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_flag_sets_browser_mode() {
        let args = Args::parse(["mdv", "test.md", "--browser"]);
        assert!(args.browser);
        assert_eq!(args.file.as_deref(), Some("test.md"));
    }

    #[test]
    fn test_fullscreen_flag_sets_fullscreen_mode() {
        let args = Args::parse(["mdv", "test.md", "-f"]);
        assert!(args.fullscreen);
        assert!(!args.browser);
        assert_eq!(args.file.as_deref(), Some("test.md"));
    }

    #[test]
    fn test_multiple_flags_set_all() {
        let args = Args::parse(["mdv", "test.md", "--browser", "--fullscreen"]);
        assert!(args.browser);
        assert!(args.fullscreen);
        assert_eq!(args.file.as_deref(), Some("test.md"));
    }

    #[test]
    fn test_app_flag_clears_earlier_browser_flag() {
        let args = Args::parse(["mdv", "-b", "test.md", "--app"]);
        assert!(!args.browser);
    }

    #[test]
    fn test_short_and_long_flags_are_equivalent() {
        for (long, short) in [("--browser", "-b"), ("--app", "-a"), ("--fullscreen", "-f")] {
            assert_eq!(
                Args::parse(["mdv", "test.md", long]),
                Args::parse(["mdv", "test.md", short]),
                "{long} vs {short}"
            );
        }
    }

    #[test]
    fn test_no_file_gives_none() {
        let args = Args::parse(["mdv", "--browser"]);
        assert!(args.browser);
        assert_eq!(args.file, None);
        assert_eq!(Args::parse(["mdv"]), Args::default());
    }

    #[test]
    fn test_unknown_flags_are_ignored() {
        let args = Args::parse(["mdv", "test.md", "--unknown-flag", "-x"]);
        assert_eq!(
            args,
            Args {
                file: Some("test.md".to_string()),
                browser: false,
                fullscreen: false,
            }
        );
    }

    #[test]
    fn test_last_file_argument_wins() {
        let args = Args::parse(["mdv", "first.md", "second.md"]);
        assert_eq!(args.file.as_deref(), Some("second.md"));
    }

    #[test]
    fn test_program_name_is_skipped() {
        let args = Args::parse(["looks-like-a-file.md"]);
        assert_eq!(args.file, None);
    }

    #[test]
    fn test_usage_has_section_markers() {
        assert!(USAGE.contains("Usage"));
        assert!(USAGE.contains("Options"));
        assert!(USAGE.contains("Examples"));
    }
}
