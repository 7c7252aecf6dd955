use crossterm::event::KeyEvent;

/// Direction for cursor movement inside a text area.
#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    LineStart,
    LineEnd,
}

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Paste(String),
    Resize,

    // -- Form editing
    InsertChar(char),
    DeleteChar,
    NewLine,
    MoveCursor(Direction),
    SetMode(crate::model::mode::Mode),

    // -- Addon list
    SelectNext,
    SelectPrev,
    ToggleSelected,
    RequestUninstall,
    ConfirmUninstall(bool),
    InstallFromForm,

    // -- System
    Tick,
    Quit,
}
