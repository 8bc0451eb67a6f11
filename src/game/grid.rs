use super::error::GameError;
use super::state::Position;

/// Contents of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Wall,
    Food,
    Snake,
}

impl Cell {
    /// Character used for this cell in the text rendering
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Wall => '#',
            Cell::Food => 'O',
            Cell::Snake => 'X',
        }
    }
}

/// Fixed-size play field, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check if a position is within the grid bounds
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// Cell at `pos`, or `None` when `pos` is off the grid.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<(), GameError> {
        let i = self.index(pos).ok_or(GameError::OffGrid(pos))?;
        self.cells[i] = cell;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// True when no empty cell remains.
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(move |(i, _)| Position::new((i % self.width) as i32, (i / self.width) as i32))
    }

    /// Text rendering framed by one ring of wall symbols.
    pub fn render(&self) -> String {
        let wall = Cell::Wall.symbol();
        let border: String = std::iter::repeat(wall).take(self.width + 2).collect();

        let mut rows = Vec::with_capacity(self.height + 2);
        rows.push(border.clone());
        for row in self.cells.chunks(self.width.max(1)).take(self.height) {
            let mut line = String::with_capacity(self.width + 2);
            line.push(wall);
            line.extend(row.iter().map(Cell::symbol));
            line.push(wall);
            rows.push(line);
        }
        rows.push(border);
        rows.join("\n")
    }
}
