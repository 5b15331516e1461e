//! Key and button identities

use std::hash::Hash;

/// A bounded, enumerable identity for a key or button.
///
/// Every identity space carries one reserved `Any` sentinel that stands for
/// "any identity" in subscriptions and aggregate queries. The sentinel has
/// no dense index and is rejected wherever a concrete identity is required.
pub trait InputId: Copy + Eq + Hash + std::fmt::Debug {
    /// Number of concrete identities, excluding the `Any` sentinel.
    const COUNT: usize;

    /// Dense index of a concrete identity; `None` for the `Any` sentinel.
    fn index(self) -> Option<usize>;

    /// The reserved "any" sentinel.
    fn any() -> Self;
}

/// Keyboard key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    Escape,
    LControl,
    LShift,
    LAlt,
    LSuper,
    RControl,
    RShift,
    RAlt,
    RSuper,
    Menu,

    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Period,
    Quote,
    Slash,
    Backslash,
    Tilde,
    Equal,
    Dash,

    Space,
    Enter,
    Backspace,
    Tab,
    PageUp,
    PageDown,
    End,
    Home,
    Insert,
    Delete,

    Left,
    Right,
    Up,
    Down,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    Pause,

    /// Reserved sentinel matching any key. Valid in subscriptions and
    /// aggregate queries, never as a concrete key.
    Any,
}

impl InputId for Key {
    const COUNT: usize = Key::Pause as usize + 1;

    fn index(self) -> Option<usize> {
        match self {
            Key::Any => None,
            key => Some(key as usize),
        }
    }

    fn any() -> Self {
        Key::Any
    }
}

impl Key {
    /// Maps a winit physical key code to a key identity.
    ///
    /// Returns `None` for keys outside the identity space; those raw
    /// transitions are dropped at the translation boundary.
    pub fn from_winit(key: winit::keyboard::KeyCode) -> Option<Self> {
        use winit::keyboard::KeyCode as WK;
        let key = match key {
            WK::KeyA => Self::A,
            WK::KeyB => Self::B,
            WK::KeyC => Self::C,
            WK::KeyD => Self::D,
            WK::KeyE => Self::E,
            WK::KeyF => Self::F,
            WK::KeyG => Self::G,
            WK::KeyH => Self::H,
            WK::KeyI => Self::I,
            WK::KeyJ => Self::J,
            WK::KeyK => Self::K,
            WK::KeyL => Self::L,
            WK::KeyM => Self::M,
            WK::KeyN => Self::N,
            WK::KeyO => Self::O,
            WK::KeyP => Self::P,
            WK::KeyQ => Self::Q,
            WK::KeyR => Self::R,
            WK::KeyS => Self::S,
            WK::KeyT => Self::T,
            WK::KeyU => Self::U,
            WK::KeyV => Self::V,
            WK::KeyW => Self::W,
            WK::KeyX => Self::X,
            WK::KeyY => Self::Y,
            WK::KeyZ => Self::Z,

            WK::Digit0 => Self::Num0,
            WK::Digit1 => Self::Num1,
            WK::Digit2 => Self::Num2,
            WK::Digit3 => Self::Num3,
            WK::Digit4 => Self::Num4,
            WK::Digit5 => Self::Num5,
            WK::Digit6 => Self::Num6,
            WK::Digit7 => Self::Num7,
            WK::Digit8 => Self::Num8,
            WK::Digit9 => Self::Num9,

            WK::Escape => Self::Escape,
            WK::ControlLeft => Self::LControl,
            WK::ShiftLeft => Self::LShift,
            WK::AltLeft => Self::LAlt,
            WK::SuperLeft => Self::LSuper,
            WK::ControlRight => Self::RControl,
            WK::ShiftRight => Self::RShift,
            WK::AltRight => Self::RAlt,
            WK::SuperRight => Self::RSuper,
            WK::ContextMenu => Self::Menu,

            WK::BracketLeft => Self::LBracket,
            WK::BracketRight => Self::RBracket,
            WK::Semicolon => Self::Semicolon,
            WK::Comma => Self::Comma,
            WK::Period => Self::Period,
            WK::Quote => Self::Quote,
            WK::Slash => Self::Slash,
            WK::Backslash => Self::Backslash,
            WK::Backquote => Self::Tilde,
            WK::Equal => Self::Equal,
            WK::Minus => Self::Dash,

            WK::Space => Self::Space,
            WK::Enter => Self::Enter,
            WK::Backspace => Self::Backspace,
            WK::Tab => Self::Tab,
            WK::PageUp => Self::PageUp,
            WK::PageDown => Self::PageDown,
            WK::End => Self::End,
            WK::Home => Self::Home,
            WK::Insert => Self::Insert,
            WK::Delete => Self::Delete,

            WK::ArrowLeft => Self::Left,
            WK::ArrowRight => Self::Right,
            WK::ArrowUp => Self::Up,
            WK::ArrowDown => Self::Down,

            WK::F1 => Self::F1,
            WK::F2 => Self::F2,
            WK::F3 => Self::F3,
            WK::F4 => Self::F4,
            WK::F5 => Self::F5,
            WK::F6 => Self::F6,
            WK::F7 => Self::F7,
            WK::F8 => Self::F8,
            WK::F9 => Self::F9,
            WK::F10 => Self::F10,
            WK::F11 => Self::F11,
            WK::F12 => Self::F12,

            WK::Pause => Self::Pause,

            _ => return None,
        };
        Some(key)
    }
}

/// Pointer button codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Middle,
    X1,
    X2,

    /// Reserved sentinel matching any button.
    Any,
}

impl InputId for Button {
    const COUNT: usize = Button::X2 as usize + 1;

    fn index(self) -> Option<usize> {
        match self {
            Button::Any => None,
            button => Some(button as usize),
        }
    }

    fn any() -> Self {
        Button::Any
    }
}

impl Button {
    /// Maps a winit mouse button to a button identity.
    pub fn from_winit(button: winit::event::MouseButton) -> Option<Self> {
        use winit::event::MouseButton as WB;
        match button {
            WB::Left => Some(Self::Left),
            WB::Right => Some(Self::Right),
            WB::Middle => Some(Self::Middle),
            WB::Back => Some(Self::X1),
            WB::Forward => Some(Self::X2),
            WB::Other(_) => None,
        }
    }
}
