//! Terminal setup and teardown.

use color_eyre::{Result, config::HookBuilder};
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::panic;

/// Raw-mode alternate screen owning the ratatui terminal.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl Tui {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
            active: false,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        self.terminal.clear()?;
        self.active = true;
        Ok(())
    }

    /// Leave the alternate screen. A second call is a no-op.
    pub fn exit(&mut self) -> Result<()> {
        if std::mem::replace(&mut self.active, false) {
            restore()?;
        }
        Ok(())
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            eprintln!("Failed to restore terminal: {e}");
        }
    }
}

/// Put the terminal back into cooked mode on the main screen.
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}

/// Install color-eyre hooks. Panics restore the terminal before the report
/// is printed, otherwise it lands on the alternate screen.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .display_env_section(false)
        .into_hooks();

    let panic_hook = panic_hook.into_panic_hook();
    panic::set_hook(Box::new(move |info| {
        tracing::error!("panic: {}", info);
        if let Err(e) = restore() {
            eprintln!("Failed to restore terminal: {e}");
        }
        panic_hook(info);
    }));

    eyre_hook.install()?;
    Ok(())
}
