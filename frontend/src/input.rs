use sdl2::keyboard::Keycode;

/// Map an SDL keycode to its VIC-20 keyboard matrix code (`0xRC`: high
/// nibble row, low nibble column), or `None` for keys with no position
/// in the matrix.
///
/// The layout follows the physical VIC-20 matrix, so some host keys land
/// on their positional rather than symbolic equivalent (e.g. Backquote is
/// the left-arrow key, Home is CLR/HOME, Escape is RUN/STOP).
pub fn matrix_code(keycode: Keycode) -> Option<u8> {
    let code = match keycode {
        Keycode::Backspace => 0x07,
        Keycode::Return => 0x17,
        Keycode::Right => 0x27,
        Keycode::Down => 0x37,
        Keycode::F1 => 0x47,
        Keycode::F3 => 0x57,
        Keycode::F5 => 0x67,
        Keycode::F7 => 0x77,

        Keycode::RightBracket => 0x16,
        Keycode::Semicolon => 0x26,
        Keycode::Slash => 0x36,
        Keycode::RShift => 0x46,
        Keycode::Quote => 0x56,
        Keycode::Home => 0x76,

        Keycode::Equals => 0x05,
        Keycode::P => 0x15,
        Keycode::L => 0x25,
        Keycode::Comma => 0x35,
        Keycode::Period => 0x45,
        Keycode::LeftBracket => 0x65,
        Keycode::Minus => 0x75,

        Keycode::Num9 => 0x04,
        Keycode::I => 0x14,
        Keycode::J => 0x24,
        Keycode::N => 0x34,
        Keycode::M => 0x44,
        Keycode::K => 0x54,
        Keycode::O => 0x64,
        Keycode::Num0 => 0x74,

        Keycode::Num7 => 0x03,
        Keycode::Y => 0x13,
        Keycode::G => 0x23,
        Keycode::V => 0x33,
        Keycode::B => 0x43,
        Keycode::H => 0x53,
        Keycode::U => 0x63,
        Keycode::Num8 => 0x73,

        Keycode::Num5 => 0x02,
        Keycode::R => 0x12,
        Keycode::D => 0x22,
        Keycode::X => 0x32,
        Keycode::C => 0x42,
        Keycode::F => 0x52,
        Keycode::T => 0x62,
        Keycode::Num6 => 0x72,

        Keycode::Num3 => 0x01,
        Keycode::W => 0x11,
        Keycode::A => 0x21,
        Keycode::LShift => 0x31,
        Keycode::Z => 0x41,
        Keycode::S => 0x51,
        Keycode::E => 0x61,
        Keycode::Num4 => 0x71,

        Keycode::Num1 => 0x00,
        Keycode::Backquote => 0x10,
        Keycode::Tab => 0x20,
        Keycode::Escape => 0x30,
        Keycode::Space => 0x40,
        Keycode::LCtrl => 0x50,
        Keycode::Q => 0x60,
        Keycode::Num2 => 0x70,

        _ => return None,
    };
    Some(code)
}
