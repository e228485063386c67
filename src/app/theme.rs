//! Theme preference as an explicit, injectable service: constructed once at
//! startup, queried with `get`, changed with `set`, observed through
//! subscriptions. The chosen mode is persisted to a small preference file;
//! task data is never stored locally.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> ThemeMode {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

/// Colors the widgets draw with; resolved from the current mode on every
/// frame.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub selection_fg: Color,
    pub selection_bg: Color,
}

const DARK: Palette = Palette {
    text: Color::White,
    dim: Color::DarkGray,
    accent: Color::Cyan,
    success: Color::Green,
    warning: Color::Yellow,
    danger: Color::Red,
    selection_fg: Color::Black,
    selection_bg: Color::LightGreen,
};

const LIGHT: Palette = Palette {
    text: Color::Black,
    dim: Color::Gray,
    accent: Color::Blue,
    success: Color::Green,
    warning: Color::Magenta,
    danger: Color::Red,
    selection_fg: Color::White,
    selection_bg: Color::Blue,
};

type Subscriber = Box<dyn Fn(ThemeMode)>;

pub struct ThemeService {
    mode: ThemeMode,
    path: PathBuf,
    subscribers: Vec<Subscriber>,
}

impl ThemeService {
    /// Reads the persisted preference, falling back to the default mode if
    /// the file is missing or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mode = read_mode(&path).unwrap_or_default();
        ThemeService {
            mode,
            path,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> ThemeMode {
        self.mode
    }

    pub fn set(&mut self, mode: ThemeMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if let Err(err) = self.persist() {
            warn!(error = %err, "failed to persist theme preference");
        }
        for subscriber in &self.subscribers {
            subscriber(mode);
        }
    }

    pub fn toggle(&mut self) {
        self.set(self.mode.toggled());
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(ThemeMode) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn palette(&self) -> Palette {
        match self.mode {
            ThemeMode::Dark => DARK,
            ThemeMode::Light => LIGHT,
        }
    }

    fn persist(&self) -> io::Result<()> {
        let body = serde_json::to_string(&self.mode)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, body)
    }
}

fn read_mode(path: &Path) -> Option<ThemeMode> {
    let body = fs::read_to_string(path).ok()?;
    serde_json::from_str(&body).ok()
}
