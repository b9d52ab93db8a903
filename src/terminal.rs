// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    event::{DisableFocusChange, EnableFocusChange},
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::Frame;

/// Raw-mode alternate-screen writer. Construction failure means the host
/// surface is unavailable; callers skip the effect instead of erroring.
pub struct Terminal {
    stdout: Stdout,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            let _ = out.execute(EnableFocusChange);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Flush the frame's pending changes. Small change sets go out as
    /// per-row runs; a mostly-dirty frame repaints in one pass.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let Self { stdout, run_buf } = self;

        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut cur_bold = false;

        let total = frame.width as usize * frame.height as usize;
        let full =
            frame.is_dirty_all() || (total > 0 && frame.dirty_indices().len() >= total / 3);

        if full {
            if frame.is_dirty_all() {
                stdout.queue(terminal::Clear(terminal::ClearType::All))?;
            }
            for y in 0..frame.height {
                stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    apply_attrs(
                        stdout,
                        (&mut cur_fg, &mut cur_bg, &mut cur_bold),
                        (cell.fg, cell.bg, cell.bold),
                    )?;
                    stdout.queue(Print(cell.ch))?;
                }
            }
        } else {
            frame.sort_dirty();
            let width = (frame.width as usize).max(1);
            let dirty = frame.dirty_indices();

            let mut i = 0usize;
            while i < dirty.len() {
                let idx0 = dirty[i];
                let cell0 = frame.cell_at_index(idx0);
                let row = idx0 / width;
                let x = (idx0 % width) as u16;
                let y = row as u16;

                run_buf.clear();
                run_buf.push(cell0.ch);
                let mut last_idx = idx0;
                let mut j = i + 1;
                while j < dirty.len() {
                    let idx1 = dirty[j];
                    if idx1 != last_idx + 1 || idx1 / width != row {
                        break;
                    }
                    let c1 = frame.cell_at_index(idx1);
                    if c1.fg != cell0.fg || c1.bg != cell0.bg || c1.bold != cell0.bold {
                        break;
                    }
                    run_buf.push(c1.ch);
                    last_idx = idx1;
                    j += 1;
                }

                stdout.queue(cursor::MoveTo(x, y))?;
                apply_attrs(
                    stdout,
                    (&mut cur_fg, &mut cur_bg, &mut cur_bold),
                    (cell0.fg, cell0.bg, cell0.bold),
                )?;
                stdout.queue(Print(run_buf.as_str()))?;

                i = j;
            }
        }

        stdout.queue(SetAttribute(Attribute::Reset))?;
        stdout.queue(ResetColor)?;
        stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

fn apply_attrs(
    out: &mut Stdout,
    cur: (&mut Option<Color>, &mut Option<Color>, &mut bool),
    next: (Option<Color>, Option<Color>, bool),
) -> Result<()> {
    let (cur_fg, cur_bg, cur_bold) = cur;
    let (fg, bg, bold) = next;

    if fg != *cur_fg {
        out.queue(SetForegroundColor(fg.unwrap_or(Color::Reset)))?;
        *cur_fg = fg;
    }
    if bg != *cur_bg {
        out.queue(SetBackgroundColor(bg.unwrap_or(Color::Reset)))?;
        *cur_bg = bg;
    }
    if bold != *cur_bold {
        out.queue(SetAttribute(if bold {
            Attribute::Bold
        } else {
            Attribute::NormalIntensity
        }))?;
        *cur_bold = bold;
    }
    Ok(())
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(DisableFocusChange);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
