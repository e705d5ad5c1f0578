use crate::geometry::GrainTransform;
use crate::types::{GrainAxis, PanelOutput, PlacedItem, Rect};

const MAX_COLS: f64 = 80.0;
const MAX_ROWS: f64 = 40.0;

/// Area an item covers on the panel. Display dimensions are in the item's own
/// orientation, so cross-grain items are turned back into the cutting frame.
pub fn footprint(item: &PlacedItem, reference: GrainAxis) -> Rect {
    GrainTransform::between(item.grain, reference).apply(Rect::new(item.width, item.height))
}

/// ASCII drawing of one panel, labelled with item ids. `reference` is the
/// panel's own grain, which its items were oriented against when packing.
pub fn render_panel(panel: &PanelOutput, reference: GrainAxis) -> String {
    let scale = f64::min(
        MAX_COLS / panel.width as f64,
        MAX_ROWS / panel.height as f64,
    );
    let cells = |v: u32| (v as f64 * scale).round() as usize;

    let (cols, rows) = (cells(panel.width), cells(panel.height));
    if cols == 0 || rows == 0 {
        return String::new();
    }

    let mut canvas = Canvas::new(cols + 1, rows + 1);
    canvas.frame(0, 0, cols, rows);

    for item in &panel.used_items {
        let rect = footprint(item, reference);
        let (x, y) = (cells(item.x), cells(item.y));
        let (w, h) = (cells(rect.w), cells(rect.h));
        if w == 0 || h == 0 {
            continue;
        }
        canvas.frame(x, y, w, h);
        if w > 2 {
            canvas.label(x, y, w, h, &item.item_id);
        }
    }

    canvas.to_string()
}

struct Canvas {
    cells: Vec<Vec<char>>,
}

impl Canvas {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cells: vec![vec![' '; cols]; rows],
        }
    }

    fn set(&mut self, col: usize, row: usize, own: char, crossing: char) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = if *cell == crossing || *cell == '+' {
                '+'
            } else {
                own
            };
        }
    }

    fn frame(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for col in x..=x + w {
            self.set(col, y, '-', '|');
            self.set(col, y + h, '-', '|');
        }
        for row in y..=y + h {
            self.set(x, row, '|', '-');
            self.set(x + w, row, '|', '-');
        }
        for (col, row) in [(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
            self.set(col, row, '+', '+');
        }
    }

    /// Centres `text` inside the frame at (x, y, w, h), clipped to its interior.
    fn label(&mut self, x: usize, y: usize, w: usize, h: usize, text: &str) {
        let row = y + h / 2;
        if row <= y || row >= y + h {
            return;
        }
        let start = (x + w / 2).saturating_sub(text.chars().count() / 2);
        for (i, ch) in text.chars().enumerate() {
            let col = start + i;
            if col > x
                && col < x + w
                && let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col))
            {
                *cell = ch;
            }
        }
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
