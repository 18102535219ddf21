//! Text rendering of memory contents.
//!
//! Sixteen cells per row, in groups of four, labelled with the hex range of
//! the row:
//!
//! ```text
//! 00-0F: 1000 0000 0000 0000
//! ```

use crate::engine::ScanEngine;

const ROW: usize = 16;
const GROUP: usize = 4;

/// Render `cells` as a memory dump, one line per 16 cells.
pub fn render(cells: &[bool]) -> String {
    let last_label = cells.len().div_ceil(ROW).saturating_sub(1) * ROW + ROW - 1;
    let width = format!("{last_label:X}").len().max(2);

    let mut out = String::new();
    for (row, chunk) in cells.chunks(ROW).enumerate() {
        let start = row * ROW;
        out.push_str(&format!(
            "{start:0width$X}-{:0width$X}: ",
            start + ROW - 1
        ));
        for (g, group) in chunk.chunks(GROUP).enumerate() {
            if g > 0 {
                out.push(' ');
            }
            out.extend(group.iter().map(|&bit| if bit { '1' } else { '0' }));
        }
        out.push('\n');
    }
    out
}

/// Render the engine's current read bank over its declared size.
///
/// The extra cell that `BoundsPolicy::Inclusive` adds past the end is not
/// shown.
pub fn render_engine(engine: &ScanEngine) -> String {
    let banks = engine.banks();
    let cells = banks.snapshot();
    render(&cells[..banks.size().min(cells.len())])
}
