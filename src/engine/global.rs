//! Process-wide canvas.
//!
//! The page builder keeps one canvas for the lifetime of the process. It is
//! seeded on first use and never torn down; tests reset it between cases.
//! Code that wants isolation should construct its own [`Canvas`] instead.

use super::canvas::Canvas;

thread_local! {
    static CANVAS: Canvas = Canvas::new();
}

/// Handle to this thread's canvas.
pub fn current_canvas() -> Canvas {
    CANVAS.with(Canvas::clone)
}

/// Run `f` with this thread's canvas.
pub fn with_canvas<R>(f: impl FnOnce(&Canvas) -> R) -> R {
    CANVAS.with(f)
}

/// Reset this thread's canvas to the seeded root (for testing).
pub fn reset_canvas() {
    CANVAS.with(Canvas::reset);
}
