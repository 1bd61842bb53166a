use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks of the running tour (or the demo host).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourCommand {
    Next,
    Prev,
    /// Dismiss the tour, leaving the host running.
    Exit,
    /// Start the tour again from the first step.
    Restart,
    /// Jump to a 1-based step.
    Goto(usize),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapPreset {
    Default,
    Vim,
}

impl KeymapPreset {
    pub fn parse(value: &str) -> Self {
        match value {
            "default" => Self::Default,
            "vim" => Self::Vim,
            _ => Self::Default,
        }
    }
}

pub fn map_key_to_command(key: KeyEvent, tour_active: bool) -> Option<TourCommand> {
    map_key_to_command_with_preset(key, tour_active, KeymapPreset::Default)
}

pub fn map_key_to_command_with_preset(
    key: KeyEvent,
    tour_active: bool,
    preset: KeymapPreset,
) -> Option<TourCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(TourCommand::Quit),
            _ => None,
        };
    }

    if !tour_active {
        return map_idle_key(key);
    }

    match preset {
        KeymapPreset::Default => map_tour_key_default(key),
        KeymapPreset::Vim => map_tour_key_vim(key),
    }
}

fn map_idle_key(key: KeyEvent) -> Option<TourCommand> {
    match key.code {
        KeyCode::Char('t') | KeyCode::Enter => Some(TourCommand::Restart),
        KeyCode::Char('q') | KeyCode::Esc => Some(TourCommand::Quit),
        _ => None,
    }
}

fn map_tour_key_default(key: KeyEvent) -> Option<TourCommand> {
    match key.code {
        KeyCode::Right | KeyCode::Enter | KeyCode::Char('l') => Some(TourCommand::Next),
        KeyCode::Left | KeyCode::Char('h') => Some(TourCommand::Prev),
        KeyCode::Esc | KeyCode::Char('q') => Some(TourCommand::Exit),
        KeyCode::Char('t') => Some(TourCommand::Restart),
        KeyCode::Char(digit @ '1'..='9') => digit
            .to_digit(10)
            .map(|step| TourCommand::Goto(step as usize)),
        _ => None,
    }
}

fn map_tour_key_vim(key: KeyEvent) -> Option<TourCommand> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Char('n') => Some(TourCommand::Next),
        KeyCode::Char('k') | KeyCode::Char('p') => Some(TourCommand::Prev),
        _ => map_tour_key_default(key),
    }
}
