//! Page and slot geometry for double-sided card sheets.
//!
//! Every page of cards is printed as two sheet sides. The front holds the
//! cards in row-major order, the back holds the same cards with each row
//! mirrored left to right, so that flipping the printed sheet along its
//! vertical axis puts every card's text behind its own code.

/// A4 landscape, in millimetres.
pub const A4_LANDSCAPE_WIDTH_MM: f32 = 297.0;
pub const A4_LANDSCAPE_HEIGHT_MM: f32 = 210.0;

pub const DEFAULT_CARDS_PER_ROW: usize = 6;
pub const DEFAULT_ROWS_PER_PAGE: usize = 3;

/// Largest grid the layout accepts in either direction.
pub const MAX_CARDS_PER_ROW: usize = 10;
pub const MAX_ROWS_PER_PAGE: usize = 10;

/// Grid dimensions for a sheet of cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParameters {
    pub cards_per_row: usize,
    pub rows_per_page: usize,
    pub page_width: f32,
    pub page_height: f32,
}

impl LayoutParameters {
    /// A4 landscape sheet. Counts are clamped to `1..=MAX_*`.
    pub fn new(cards_per_row: usize, rows_per_page: usize) -> Self {
        LayoutParameters {
            cards_per_row: cards_per_row.clamp(1, MAX_CARDS_PER_ROW),
            rows_per_page: rows_per_page.clamp(1, MAX_ROWS_PER_PAGE),
            page_width: A4_LANDSCAPE_WIDTH_MM,
            page_height: A4_LANDSCAPE_HEIGHT_MM,
        }
    }

    pub fn card_width(&self) -> f32 {
        self.page_width / self.cards_per_row as f32
    }

    pub fn card_height(&self) -> f32 {
        self.page_height / self.rows_per_page as f32
    }

    pub fn cards_per_page(&self) -> usize {
        self.cards_per_row
            .checked_mul(self.rows_per_page)
            .unwrap_or(usize::MAX)
    }

    /// Rectangle of grid cell `(column, row)`, row 0 at the top of the sheet.
    pub fn cell_rect(&self, column: usize, row: usize) -> CardRect {
        let width = self.card_width();
        let height = self.card_height();
        CardRect {
            x: column as f32 * width,
            y: self.page_height - (row + 1) as f32 * height,
            width,
            height,
        }
    }
}

impl Default for LayoutParameters {
    fn default() -> Self {
        LayoutParameters::new(DEFAULT_CARDS_PER_ROW, DEFAULT_ROWS_PER_PAGE)
    }
}

/// Card outline in PDF space (origin bottom-left, millimetres).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CardRect {
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// A grid position on one side of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub column: usize,
    pub row: usize,
    pub rect: CardRect,
    /// Index into the full record list, `None` for an empty slot.
    pub card: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: usize,
    pub front: Vec<Slot>,
    pub back: Vec<Slot>,
}

impl Page {
    /// Cards on this page, in front order.
    pub fn cards(&self) -> impl Iterator<Item = usize> + '_ {
        self.front.iter().filter_map(|slot| slot.card)
    }
}

/// Number of pages needed for `record_count` cards.
pub fn page_count(record_count: usize, params: &LayoutParameters) -> usize {
    record_count.div_ceil(params.cards_per_page())
}

/// Split `record_count` cards into pages and assign every slot on both sides.
pub fn layout_pages(record_count: usize, params: &LayoutParameters) -> Vec<Page> {
    let per_page = params.cards_per_page();
    let per_row = params.cards_per_row;

    (0..page_count(record_count, params))
        .map(|index| {
            let first = index * per_page;
            let chunk_len = per_page.min(record_count - first);
            let card_at = |slot: usize| (slot < chunk_len).then_some(first + slot);

            let front = (0..per_page)
                .map(|i| {
                    let (column, row) = (i % per_row, i / per_row);
                    Slot {
                        column,
                        row,
                        rect: params.cell_rect(column, row),
                        card: card_at(i),
                    }
                })
                .collect();
            let back = (0..per_page)
                .map(|i| {
                    let (column, row) = (i % per_row, i / per_row);
                    let mirrored = row * per_row + (per_row - 1 - column);
                    Slot {
                        column,
                        row,
                        rect: params.cell_rect(column, row),
                        card: card_at(mirrored),
                    }
                })
                .collect();

            Page { index, front, back }
        })
        .collect()
}
