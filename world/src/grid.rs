use maze_escape_core::{CellCoord, LevelDescription, TileKind, TileView};

/// Dense row-major tile lattice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<TileKind>,
}

impl Grid {
    pub(crate) fn from_level(level: &LevelDescription) -> Self {
        let mut grid = Self::filled(level.columns, level.rows, TileKind::Wall);
        for tile in &level.tiles {
            let _ = grid.set(tile.cell, tile.kind);
        }
        grid
    }

    /// Open square arena used by boss encounters.
    pub(crate) fn arena(size: u32) -> Self {
        Self::filled(size, size, TileKind::Floor)
    }

    fn filled(columns: u32, rows: u32, kind: TileKind) -> Self {
        let len = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![kind; len],
        }
    }

    pub(crate) fn kind(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Replaces the tile at `cell`, returning the previous kind.
    pub(crate) fn set(&mut self, cell: CellCoord, kind: TileKind) -> Option<TileKind> {
        let index = self.index(cell)?;
        let slot = self.cells.get_mut(index)?;
        Some(std::mem::replace(slot, kind))
    }

    pub(crate) fn count(&self, kind: TileKind) -> usize {
        self.cells.iter().filter(|cell| **cell == kind).count()
    }

    /// Cells currently holding `kind` in row-major order.
    pub(crate) fn cells_of(&self, kind: TileKind) -> Vec<CellCoord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, candidate)| **candidate == kind)
            .filter_map(|(index, _)| self.coord(index))
            .collect()
    }

    pub(crate) fn view(&self) -> TileView<'_> {
        TileView::new(&self.cells, self.columns, self.rows)
    }

    pub(crate) fn tiles(&self) -> &[TileKind] {
        &self.cells
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !cell.within(self.columns, self.rows) {
            return None;
        }
        let offset = u64::from(cell.row()) * u64::from(self.columns) + u64::from(cell.column());
        usize::try_from(offset).ok()
    }

    fn coord(&self, index: usize) -> Option<CellCoord> {
        let index = u32::try_from(index).ok()?;
        Some(CellCoord::new(index % self.columns, index / self.columns))
    }
}
