use crate::tui::action::{Action, ActionCategory};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// Maps key events to actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(rename = "bindings")]
    bindings_list: Vec<KeyBinding>,

    #[serde(skip)]
    bindings_map: HashMap<KeyPattern, Action>,
}

/// Single keybinding entry, e.g. `{ "key": "Ctrl+f", "action": "FocusSearch" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    pub action: Action,
}

impl KeyBinding {
    pub fn new(key: &str, action: Action) -> Self {
        Self {
            key: key.to_string(),
            action,
        }
    }
}

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("Up", Action::MoveUp),
    ("Down", Action::MoveDown),
    ("Left", Action::MoveLeft),
    ("Right", Action::MoveRight),
    ("k", Action::MoveUp),
    ("j", Action::MoveDown),
    ("h", Action::MoveLeft),
    ("l", Action::MoveRight),
    ("PageUp", Action::PageUp),
    ("PageDown", Action::PageDown),
    ("Ctrl+u", Action::PageUp),
    ("Ctrl+d", Action::PageDown),
    ("Home", Action::Home),
    ("End", Action::End),
    ("0", Action::Home),
    ("$", Action::End),
    ("g", Action::GoToTop),
    ("G", Action::GoToBottom),
    ("s", Action::CycleSort),
    ("S", Action::ClearSort),
    ("/", Action::FocusSearch),
    ("Ctrl+f", Action::FocusSearch),
    ("x", Action::ClearSearch),
    ("f", Action::ToggleColumnFilters),
    ("X", Action::ClearColumnFilters),
    ("Ctrl+l", Action::ClearInput),
    ("v", Action::ToggleVisibilityMenu),
    ("H", Action::HideColumn),
    ("A", Action::ShowAllColumns),
    ("Z", Action::HideAllColumns),
    ("?", Action::ToggleHelp),
    ("F1", Action::ToggleHelp),
    ("r", Action::Refresh),
    ("F5", Action::Refresh),
    ("R", Action::ResetView),
    ("Tab", Action::NextPage),
    ("Shift+Tab", Action::PrevPage),
    ("q", Action::Quit),
    ("Enter", Action::Confirm),
    ("Esc", Action::Cancel),
];

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings_list = DEFAULT_BINDINGS
            .iter()
            .map(|(key, action)| KeyBinding::new(key, *action))
            .collect();
        Self::from_list(bindings_list)
    }
}

impl KeyBindings {
    pub fn from_list(bindings_list: Vec<KeyBinding>) -> Self {
        let bindings_map = Self::build_map(&bindings_list);
        Self {
            bindings_list,
            bindings_map,
        }
    }

    fn build_map(bindings: &[KeyBinding]) -> HashMap<KeyPattern, Action> {
        bindings
            .iter()
            .filter_map(|b| KeyPattern::parse(&b.key).ok().map(|p| (p, b.action)))
            .collect()
    }

    /// Defaults with user bindings layered on top
    ///
    /// A user binding replaces any default bound to the same key.
    pub fn with_overrides(overrides: &[KeyBinding]) -> Self {
        let mut defaults = Self::default();
        let overridden: HashSet<KeyPattern> = overrides
            .iter()
            .filter_map(|b| KeyPattern::parse(&b.key).ok())
            .collect();
        defaults.bindings_list.retain(|b| {
            KeyPattern::parse(&b.key)
                .map(|p| !overridden.contains(&p))
                .unwrap_or(true)
        });
        defaults.bindings_list.extend(overrides.iter().cloned());
        Self::from_list(defaults.bindings_list)
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings_list
    }

    /// Get action for key event
    pub fn get_action(&self, key: &KeyEvent) -> Option<Action> {
        self.bindings_map.get(&KeyPattern::from_event(key)).copied()
    }

    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let loaded: KeyBindings = serde_json::from_str(&content)?;
        Ok(Self::from_list(loaded.bindings_list))
    }

    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Get all key strings bound to an action (for help display)
    pub fn get_keys_for_action(&self, action: Action) -> Vec<String> {
        self.bindings_list
            .iter()
            .filter(|b| b.action == action)
            .map(|b| b.key.clone())
            .collect()
    }

    /// First key bound to an action, formatted for hints
    pub fn hint_for(&self, action: Action) -> Option<String> {
        self.bindings_list
            .iter()
            .find(|b| b.action == action)
            .and_then(|b| KeyPattern::parse(&b.key).ok())
            .map(|p| p.to_string())
    }

    /// One-line instructions such as "s: Sort by column  /: Search all columns"
    pub fn instructions(&self, actions: &[Action]) -> String {
        actions
            .iter()
            .filter_map(|action| {
                self.hint_for(*action)
                    .map(|key| format!("{key}: {}", action.description()))
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    /// Bound actions grouped by category, for the help overlay
    pub fn help_sections(&self) -> Vec<(ActionCategory, Vec<(String, &'static str)>)> {
        ActionCategory::all()
            .into_iter()
            .map(|category| {
                let entries = Action::all()
                    .into_iter()
                    .filter(|action| action.category() == category)
                    .filter_map(|action| {
                        let keys = self.get_keys_for_action(action);
                        (!keys.is_empty()).then(|| (keys.join(", "), action.description()))
                    })
                    .collect::<Vec<_>>();
                (category, entries)
            })
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }

    /// Actions without any binding
    pub fn get_unbound_actions(&self) -> Vec<(Action, &'static str)> {
        let bound: HashSet<Action> = self.bindings_list.iter().map(|b| b.action).collect();
        Action::all()
            .into_iter()
            .filter(|action| !bound.contains(action))
            .map(|action| (action, action.description()))
            .collect()
    }

    /// Validate bindings and return warnings
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut seen: HashMap<KeyPattern, Action> = HashMap::new();
        for binding in &self.bindings_list {
            match KeyPattern::parse(&binding.key) {
                Ok(pattern) => {
                    if let Some(existing) = seen.insert(pattern, binding.action) {
                        if existing != binding.action {
                            warnings.push(format!(
                                "Key '{}' bound to both {:?} and {:?}",
                                binding.key, existing, binding.action
                            ));
                        }
                    }
                }
                Err(err) => warnings.push(format!(
                    "Invalid key pattern '{}' for action {:?}: {err}",
                    binding.key, binding.action
                )),
            }
        }

        let unbound = self.get_unbound_actions();
        if !unbound.is_empty() {
            let names: Vec<String> = unbound.iter().map(|(a, _)| format!("{a:?}")).collect();
            warnings.push(format!(
                "{} action(s) have no keybindings: {}",
                unbound.len(),
                names.join(", ")
            ));
        }

        warnings
    }
}

/// Normalised key press used as the lookup key
///
/// Character keys carry their case in the character itself, so SHIFT is
/// dropped for them. Shift+Tab is stored as `BackTab` without modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("pageup", KeyCode::PageUp),
    ("pgup", KeyCode::PageUp),
    ("pagedown", KeyCode::PageDown),
    ("pgdn", KeyCode::PageDown),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("tab", KeyCode::Tab),
    ("backtab", KeyCode::BackTab),
    ("enter", KeyCode::Enter),
    ("return", KeyCode::Enter),
    ("esc", KeyCode::Esc),
    ("escape", KeyCode::Esc),
    ("backspace", KeyCode::Backspace),
    ("delete", KeyCode::Delete),
    ("del", KeyCode::Delete),
    ("insert", KeyCode::Insert),
    ("space", KeyCode::Char(' ')),
];

impl KeyPattern {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::normalized(code, modifiers)
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self::normalized(event.code, event.modifiers)
    }

    fn normalized(code: KeyCode, modifiers: KeyModifiers) -> Self {
        match code {
            KeyCode::Char(_) | KeyCode::BackTab => Self {
                code,
                modifiers: modifiers - KeyModifiers::SHIFT,
            },
            KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => Self {
                code: KeyCode::BackTab,
                modifiers: modifiers - KeyModifiers::SHIFT,
            },
            _ => Self { code, modifiers },
        }
    }

    /// Parse strings such as "Ctrl+f", "G", "Shift+Tab" or "F5"
    pub fn parse(s: &str) -> Result<Self, String> {
        // A lone "+" or a trailing "+" names the plus key itself
        let (prefix, key) = match s.strip_suffix("++") {
            Some(prefix) => (Some(prefix), "+"),
            None if s == "+" => (None, "+"),
            None => match s.rsplit_once('+') {
                Some((prefix, key)) => (Some(prefix), key),
                None => (None, s),
            },
        };

        let mut modifiers = KeyModifiers::empty();
        for part in prefix.into_iter().flat_map(|p| p.split('+')) {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "option" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                "super" | "cmd" | "command" => KeyModifiers::SUPER,
                other => return Err(format!("unknown modifier '{other}'")),
            };
        }

        let code = Self::parse_code(key)?;
        Ok(Self::normalized(code, modifiers))
    }

    fn parse_code(key: &str) -> Result<KeyCode, String> {
        let mut chars = key.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(KeyCode::Char(ch));
        }

        let lower = key.to_ascii_lowercase();
        if let Some((_, code)) = NAMED_KEYS.iter().find(|(name, _)| *name == lower) {
            return Ok(*code);
        }
        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            if (1..=12).contains(&n) {
                return Ok(KeyCode::F(n));
            }
        }
        Err(format!("unknown key '{key}'"))
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(KeyModifiers::SUPER) {
            parts.push("Super".into());
        }
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".into());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".into());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".into());
        }
        parts.push(match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::BackTab => "Shift+Tab".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        f.write_str(&parts.join("+"))
    }
}
