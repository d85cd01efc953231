use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use image::RgbImage;
use std::io::{self, Stdout, Write};

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: char = '▀';

pub(crate) struct TermGuard {
    pub(crate) out: Stdout,
}

impl TermGuard {
    pub(crate) fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            DisableLineWrap,
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        Ok(Self { out })
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Simulation surface size for a terminal of `cols` x `rows` with
/// `hud_rows` reserved at the top: one pixel wide and two tall per cell.
pub(crate) fn surface_size(cols: u16, rows: u16, hud_rows: u16) -> (usize, usize) {
    let render_rows = rows.saturating_sub(hud_rows) as usize;
    ((cols as usize).max(1), (render_rows * 2).max(2))
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Glyph {
    top: [u8; 3],
    bottom: [u8; 3],
}

fn rgb(c: [u8; 3]) -> Color {
    Color::Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
    }
}

/// Draws frames as half-block glyphs, re-emitting only changed cells.
pub(crate) struct HalfBlockRenderer {
    cols: usize,
    rows: usize,
    top_row: u16,
    last_frame: Vec<Option<Glyph>>,
}

impl HalfBlockRenderer {
    pub(crate) fn new(top_row: u16) -> Self {
        Self {
            cols: 0,
            rows: 0,
            top_row,
            last_frame: Vec::new(),
        }
    }

    /// Forget what is on screen; the next draw repaints every cell.
    pub(crate) fn invalidate(&mut self) {
        self.last_frame.iter_mut().for_each(|g| *g = None);
    }

    pub(crate) fn set_top_row(&mut self, top_row: u16) {
        if top_row != self.top_row {
            self.top_row = top_row;
            self.invalidate();
        }
    }

    pub(crate) fn draw(&mut self, out: &mut Stdout, img: &RgbImage) -> io::Result<()> {
        let (w, h) = img.dimensions();
        let cols = w as usize;
        let rows = (h / 2) as usize;
        if cols != self.cols || rows != self.rows {
            self.cols = cols;
            self.rows = rows;
            self.last_frame = vec![None; cols * rows];
        }

        queue!(out, BeginSynchronizedUpdate)?;
        let mut cur: Option<Glyph> = None;
        for ty in 0..rows {
            let mut cursor_at: Option<usize> = None;
            for tx in 0..cols {
                let g = Glyph {
                    top: img.get_pixel(tx as u32, (ty * 2) as u32).0,
                    bottom: img.get_pixel(tx as u32, (ty * 2 + 1) as u32).0,
                };
                let fi = ty * cols + tx;
                if self.last_frame[fi] == Some(g) {
                    cursor_at = None;
                    continue;
                }
                if cursor_at != Some(tx) {
                    queue!(out, cursor::MoveTo(tx as u16, ty as u16 + self.top_row))?;
                }
                if cur.map(|c| c.top) != Some(g.top) {
                    queue!(out, SetForegroundColor(rgb(g.top)))?;
                }
                if cur.map(|c| c.bottom) != Some(g.bottom) {
                    queue!(out, SetBackgroundColor(rgb(g.bottom)))?;
                }
                queue!(out, Print(HALF_BLOCK))?;
                cur = Some(g);
                cursor_at = Some(tx + 1);
                self.last_frame[fi] = Some(g);
            }
        }
        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()
    }
}

/// Print HUD lines at the top, padded to the terminal width.
pub(crate) fn draw_hud(out: &mut Stdout, lines: &[String], width: usize) -> io::Result<()> {
    queue!(out, ResetColor)?;
    for (i, line) in lines.iter().enumerate() {
        let shown: String = line.chars().take(width).collect();
        let pad = width.saturating_sub(shown.chars().count());
        queue!(
            out,
            cursor::MoveTo(0, i as u16),
            Print(shown),
            Print(" ".repeat(pad))
        )?;
    }
    Ok(())
}
