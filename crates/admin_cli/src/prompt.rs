//! Masked password entry on the controlling terminal.

use std::io::{Stderr, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, ClearType},
};
use engine::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

use crate::CliResult;

const ATTEMPTS: usize = 3;

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Typed,
    Erased,
    Ignored,
    Submit,
    Abort,
}

/// Applies one key press to the buffer being typed.
fn apply_key(buf: &mut String, key: KeyEvent) -> Step {
    if key.kind == KeyEventKind::Release {
        return Step::Ignored;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Step::Submit,
        KeyCode::Esc => Step::Abort,
        KeyCode::Char('c' | 'd') if ctrl => Step::Abort,
        KeyCode::Backspace if buf.pop().is_some() => Step::Erased,
        KeyCode::Char(ch) if !ctrl && buf.chars().count() < MAX_PASSWORD_LEN => {
            buf.push(ch);
            Step::Typed
        }
        _ => Step::Ignored,
    }
}

/// Restores cooked mode when dropped, also on early return.
struct RawMode;

impl RawMode {
    fn on() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn line(out: &mut Stderr, text: &str) -> CliResult<()> {
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(text)
    )?;
    out.flush()?;
    Ok(())
}

fn read_masked(out: &mut Stderr, label: &str) -> CliResult<String> {
    let _raw = RawMode::on()?;
    line(out, label)?;

    let mut buf = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut buf, key) {
            Step::Typed => queue!(out, Print('*'))?,
            Step::Erased => queue!(out, cursor::MoveLeft(1), Print(' '), cursor::MoveLeft(1))?,
            Step::Ignored => continue,
            Step::Submit => {
                line(out, "\r\n")?;
                return Ok(buf);
            }
            Step::Abort => {
                line(out, "\r\n")?;
                return Err("password entry aborted".into());
            }
        }
        out.flush()?;
    }
}

/// Asks for a new password and its confirmation.
pub fn new_password() -> CliResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..ATTEMPTS {
        let first = read_masked(&mut out, "New password: ")?;
        if first.chars().count() < MIN_PASSWORD_LEN {
            line(
                &mut out,
                &format!("At least {MIN_PASSWORD_LEN} characters are required.\r\n"),
            )?;
            continue;
        }
        if read_masked(&mut out, "Repeat password: ")? == first {
            return Ok(first);
        }
        line(&mut out, "The two entries differ.\r\n")?;
    }
    Err(format!("no valid password after {ATTEMPTS} attempts").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_erasing() {
        let mut buf = String::new();
        assert_eq!(apply_key(&mut buf, press(KeyCode::Char('a'))), Step::Typed);
        assert_eq!(apply_key(&mut buf, press(KeyCode::Char('b'))), Step::Typed);
        assert_eq!(apply_key(&mut buf, press(KeyCode::Backspace)), Step::Erased);
        assert_eq!(buf, "a");
        assert_eq!(apply_key(&mut buf, press(KeyCode::Backspace)), Step::Erased);
        assert_eq!(apply_key(&mut buf, press(KeyCode::Backspace)), Step::Ignored);
        assert_eq!(apply_key(&mut buf, press(KeyCode::Enter)), Step::Submit);
    }

    #[test]
    fn control_keys_abort() {
        let mut buf = String::from("abc");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(apply_key(&mut buf, ctrl_c), Step::Abort);
        assert_eq!(apply_key(&mut buf, press(KeyCode::Esc)), Step::Abort);
        assert_eq!(buf, "abc");
    }

    #[test]
    fn input_stops_at_the_maximum_length() {
        let mut buf = "x".repeat(MAX_PASSWORD_LEN);
        assert_eq!(apply_key(&mut buf, press(KeyCode::Char('y'))), Step::Ignored);
        assert_eq!(buf.len(), MAX_PASSWORD_LEN);
    }
}
