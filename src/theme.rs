//! Terminal color themes.

use crate::error::WurpError;

/// Escape sequences for each semantic color. `reset` is mandatory by
/// construction; an empty string means "no escape" for that color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub prompt: &'static str,
    pub red: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub blue: &'static str,
    pub reset: &'static str,
}

impl Theme {
    /// Looks up a semantic color by name.
    pub fn color(&self, name: &str) -> Option<&'static str> {
        match name {
            "prompt" => Some(self.prompt),
            "red" => Some(self.red),
            "green" => Some(self.green),
            "yellow" => Some(self.yellow),
            "blue" => Some(self.blue),
            "reset" => Some(self.reset),
            _ => None,
        }
    }
}

const RESET: &str = "\x1b[0m";

pub const BUILTIN_THEMES: &[Theme] = &[
    Theme {
        name: "default",
        prompt: "\x1b[36mwurp",
        red: "\x1b[31m",
        green: "\x1b[32m",
        yellow: "\x1b[33m",
        blue: "\x1b[34m",
        reset: RESET,
    },
    Theme {
        name: "dark",
        prompt: "\x1b[35mwurp",
        red: "\x1b[91m",
        green: "\x1b[92m",
        yellow: "\x1b[93m",
        blue: "\x1b[94m",
        reset: RESET,
    },
    Theme {
        name: "wurp",
        prompt: "\x1b[96m❯",
        red: "\x1b[91m",
        green: "\x1b[92m",
        yellow: "\x1b[93m",
        blue: "\x1b[96m",
        reset: RESET,
    },
    Theme {
        name: "mono",
        prompt: "wurp",
        red: "",
        green: "",
        yellow: "",
        blue: "",
        reset: RESET,
    },
];

/// The built-in themes plus which one is active.
pub struct ThemeRegistry {
    themes: &'static [Theme],
    active: usize,
}

impl ThemeRegistry {
    pub fn new() -> Self {
        Self {
            themes: BUILTIN_THEMES,
            active: 0,
        }
    }

    pub fn active(&self) -> &Theme {
        &self.themes[self.active]
    }

    pub fn active_name(&self) -> &'static str {
        self.themes[self.active].name
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.themes.iter().map(|t| t.name)
    }

    /// Switches to `name` (case-insensitive). Leaves the active theme alone
    /// when the name is unknown.
    pub fn set_active(&mut self, name: &str) -> Result<(), WurpError> {
        let wanted = name.to_lowercase();
        match self.themes.iter().position(|t| t.name == wanted) {
            Some(index) => {
                self.active = index;
                Ok(())
            }
            None => Err(WurpError::ThemeNotFound(wanted)),
        }
    }

    /// Wraps `text` in the active theme's escape for `color` followed by
    /// `reset`. Unknown color names return `text` untouched.
    pub fn colorize(&self, text: &str, color: &str) -> String {
        let theme = self.active();
        match theme.color(color) {
            Some(escape) => format!("{}{}{}", escape, text, theme.reset),
            None => text.to_string(),
        }
    }

    pub fn prompt_string(&self) -> String {
        let theme = self.active();
        format!("{}{}", theme.prompt, theme.reset)
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_default_theme() {
        let registry = ThemeRegistry::new();
        assert_eq!(registry.active_name(), "default");
        assert_eq!(registry.prompt_string(), "\x1b[36mwurp\x1b[0m");
    }

    #[test]
    fn test_set_active_switches_prompt_and_colors_for_every_theme() {
        for theme in BUILTIN_THEMES {
            let mut registry = ThemeRegistry::new();
            registry.set_active(theme.name).unwrap();

            assert_eq!(registry.active_name(), theme.name);
            assert_eq!(registry.prompt_string(), format!("{}{}", theme.prompt, theme.reset));
            assert_eq!(
                registry.colorize("oops", "red"),
                format!("{}oops{}", theme.red, theme.reset)
            );
        }
    }

    #[test]
    fn test_set_active_is_case_insensitive() {
        let mut registry = ThemeRegistry::new();
        registry.set_active("DARK").unwrap();
        assert_eq!(registry.active_name(), "dark");
    }

    #[test]
    fn test_unknown_theme_leaves_state_unchanged() {
        let mut registry = ThemeRegistry::new();
        registry.set_active("wurp").unwrap();

        let result = registry.set_active("bogus");

        assert_eq!(result, Err(WurpError::ThemeNotFound("bogus".to_string())));
        assert_eq!(registry.active_name(), "wurp");
    }

    #[test]
    fn test_colorize_unknown_color_returns_plain_text() {
        let registry = ThemeRegistry::new();
        assert_eq!(registry.colorize("plain", "magenta"), "plain");
    }

    #[test]
    fn test_colorize_reset_wraps_with_reset_suffix_in_every_theme() {
        for theme in BUILTIN_THEMES {
            let mut registry = ThemeRegistry::new();
            registry.set_active(theme.name).unwrap();

            let wrapped = registry.colorize("x", "reset");
            let suffix = &registry.colorize("x", "green")[theme.green.len() + 1..];

            assert_eq!(wrapped, format!("{}x{}", theme.reset, theme.reset));
            assert_eq!(suffix, theme.reset);
        }
    }

    #[test]
    fn test_every_builtin_theme_defines_reset() {
        assert!(BUILTIN_THEMES.len() >= 3);
        for theme in BUILTIN_THEMES {
            assert!(!theme.reset.is_empty(), "{} has no reset", theme.name);
        }
    }
}
