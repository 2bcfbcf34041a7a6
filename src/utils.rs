use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(&self) -> &'static str {
        match self {
            Profile::Dev => "workshift-dev",
            Profile::Prod => "workshift",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "workshift-dev" instead of "workshift"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "workshift", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (database, log file)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "workshift", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<chrono::NaiveDate, chrono::ParseError> {
    chrono::NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
}

/// Today's date in local time
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// New opaque employee id
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Parse user-entered hours. Anything that is not a number becomes NaN,
/// which shift edits treat as "no shift".
pub fn parse_hours(input: &str) -> f64 {
    input.trim().replace(',', ".").parse::<f64>().unwrap_or(f64::NAN)
}

/// Whole currency units with thousands separators: 12345 -> "12 345 ₽"
pub fn format_currency(amount: i64, symbol: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    if symbol.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{} {}", sign, grouped, symbol)
    }
}

/// Hours with one decimal, as shown on dashboards
pub fn format_hours(hours: f64) -> String {
    format!("{:.1}", hours)
}

/// Hours and rates without trailing zeros: 12 -> "12", 7.5 -> "7.5"
pub fn format_number(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: crossterm::event::KeyCode,
    pub requires_ctrl: bool,
}

impl ParsedKeyBinding {
    /// Whether a key event triggers this binding
    pub fn matches(&self, key: &crossterm::event::KeyEvent) -> bool {
        key.code == self.key_code && has_primary_modifier(key.modifiers) == self.requires_ctrl
    }
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: crossterm::event::KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
            || modifiers.contains(crossterm::event::KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display, showing the platform-appropriate modifier
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "n", "["), special keys ("Enter", "Left", "F1"),
/// and modifiers ("Ctrl+t")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        let key_code = parse_key_code(key_part)?;
        return Ok(ParsedKeyBinding {
            key_code,
            requires_ctrl: true,
        });
    }

    let key_code = parse_key_code(key_str)?;
    Ok(ParsedKeyBinding {
        key_code,
        requires_ctrl: false,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<crossterm::event::KeyCode, String> {
    use crossterm::event::KeyCode;

    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "BackTab" => Ok(KeyCode::BackTab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rstest::rstest;

    #[rstest]
    #[case(0, "0 ₽")]
    #[case(999, "999 ₽")]
    #[case(1000, "1 000 ₽")]
    #[case(1234567, "1 234 567 ₽")]
    #[case(-4500, "-4 500 ₽")]
    fn currency_groups_thousands(#[case] amount: i64, #[case] expected: &str) {
        assert_eq!(format_currency(amount, "₽"), expected);
    }

    #[rstest]
    #[case(12.0, "12")]
    #[case(7.5, "7.5")]
    #[case(0.25, "0.25")]
    #[case(500.0, "500")]
    fn numbers_drop_trailing_zeros(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_number(value), expected);
    }

    #[test]
    fn currency_without_symbol() {
        assert_eq!(format_currency(12000, ""), "12 000");
    }

    #[rstest]
    #[case("12", 12.0)]
    #[case(" 7.5 ", 7.5)]
    #[case("7,5", 7.5)]
    fn hours_parse(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_hours(input), expected);
    }

    #[test]
    fn non_numeric_hours_are_nan() {
        assert!(parse_hours("").is_nan());
        assert!(parse_hours("twelve").is_nan());
    }

    #[test]
    fn key_bindings_parse() {
        let binding = parse_key_binding("Ctrl+t").unwrap();
        assert!(binding.requires_ctrl);
        assert_eq!(binding.key_code, KeyCode::Char('t'));
        assert_eq!(parse_key_binding("F1").unwrap().key_code, KeyCode::F(1));
        assert_eq!(parse_key_binding("[").unwrap().key_code, KeyCode::Char('['));
        assert!(parse_key_binding("Hyper").is_err());
    }

    #[test]
    fn binding_matches_event() {
        let binding = parse_key_binding("q").unwrap();
        assert!(binding.matches(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!binding.matches(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
