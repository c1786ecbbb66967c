//! Drawing backend wrapper that tolerates missing fonts.
//!
//! Headless hosts often have no system fonts. Text drawing then fails (or
//! panics inside the font loader) and would abort the whole chart. This
//! wrapper skips the text instead and estimates its size from the font size,
//! so shapes, bars and axes still render. The first skipped text in the
//! process is logged at warn level so unlabeled charts can be explained.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use tracing::{debug, warn};

/// Approximate glyph advance relative to font size.
const FALLBACK_GLYPH_WIDTH: f64 = 0.6;

static TEXT_DROP_REPORTED: AtomicBool = AtomicBool::new(false);

/// Warn the first time `flag` sees dropped text. Returns whether it warned.
fn report_text_dropped(flag: &AtomicBool, reason: &str) -> bool {
    if flag.swap(true, Ordering::Relaxed) {
        return false;
    }
    warn!(
        reason,
        "No usable font for chart text; titles, labels and legends will be missing. \
         Install a sans-serif font (e.g. fonts-dejavu) to restore them"
    );
    true
}

pub struct TextSafeBackend<DB> {
    inner: DB,
}

impl<DB> TextSafeBackend<DB> {
    pub const fn new(inner: DB) -> Self {
        Self { inner }
    }
}

impl<DB: DrawingBackend> DrawingBackend for TextSafeBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.fill_polygon(vert, style)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.inner.draw_text(text, style, pos))) {
            Ok(Err(DrawingErrorKind::FontError(e))) => {
                let reason = e.to_string();
                report_text_dropped(&TEXT_DROP_REPORTED, &reason);
                debug!(error = %reason, text, "Font unavailable, text skipped");
                Ok(())
            }
            Ok(result) => result,
            Err(_) => {
                report_text_dropped(&TEXT_DROP_REPORTED, "font loader panicked");
                debug!(text, "Text rendering panicked, text skipped");
                Ok(())
            }
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.inner.estimate_text_size(text, style))) {
            Ok(Ok(size)) => Ok(size),
            Ok(Err(DrawingErrorKind::DrawingError(e))) => Err(DrawingErrorKind::DrawingError(e)),
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => Ok(approximate_text_size(text, style.size())),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn approximate_text_size(text: &str, font_size: f64) -> (u32, u32) {
    let width = text.chars().count() as f64 * font_size * FALLBACK_GLYPH_WIDTH;
    (width.ceil().max(1.0) as u32, font_size.ceil().max(1.0) as u32)
}
