//! Dependency tracking for formula calculation

use crate::ast::Reference;
use crate::parser::parse_formula;
use ahash::{AHashMap, AHashSet};
use gridcalc_core::{CellAddress, GridAccess};
use tracing::trace;

/// Unique key for a cell (row + column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: u32,
    pub col: u32,
}

impl CellKey {
    /// Create a new cell key
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Create from a cell address
    pub fn from_address(addr: &CellAddress) -> Self {
        Self::new(addr.row, addr.col)
    }
}

/// Dependency graph for formula cells
///
/// Tracks which cells each formula cell reads, enabling ordered
/// recalculation and cycle detection.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → Cells it depends on (precedents)
    precedents: AHashMap<CellKey, AHashSet<CellKey>>,
    /// Formula cells in row-major order
    formulas: Vec<CellKey>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every formula cell of a grid
    ///
    /// Ranges are expanded cell by cell, clipped to the grid. Formulas that
    /// fail to parse contribute no edges.
    pub fn from_grid<G: GridAccess + ?Sized>(grid: &G) -> Self {
        let mut graph = Self::new();
        let (rows, cols) = (grid.row_count(), grid.col_count());

        for row in 0..rows {
            for col in 0..cols {
                let text = match grid.cell(row, col).and_then(|c| c.formula()) {
                    Some(text) => text,
                    None => continue,
                };
                let cell = CellKey::new(row, col);
                graph.formulas.push(cell);

                let expr = match parse_formula(text) {
                    Ok(expr) => expr,
                    Err(_) => continue,
                };
                expr.visit_references(&mut |reference| match reference {
                    Reference::Cell(addr) => {
                        graph.add_dependency(CellKey::from_address(addr), cell);
                    }
                    Reference::Range(range) => {
                        let (r1, c1) = range.top_left();
                        let (r2, c2) = range.bottom_right();
                        if r1 >= rows || c1 >= cols {
                            return;
                        }
                        for r in r1..=r2.min(rows - 1) {
                            for c in c1..=c2.min(cols - 1) {
                                graph.add_dependency(CellKey::new(r, c), cell);
                            }
                        }
                    }
                });
            }
        }

        trace!(
            formulas = graph.formulas.len(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        graph
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellKey, dependent: CellKey) {
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Get cells that the given cell depends on
    pub fn get_precedents(&self, cell: CellKey) -> impl Iterator<Item = CellKey> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Number of precedent → dependent edges
    pub fn edge_count(&self) -> usize {
        self.precedents.values().map(|s| s.len()).sum()
    }

    /// Formula cells ordered so every cell comes after its precedents
    ///
    /// Cells on a cycle appear in an arbitrary position relative to each
    /// other.
    pub fn calculation_order(&self) -> Vec<CellKey> {
        let mut result = Vec::with_capacity(self.formulas.len());
        let mut visited = AHashSet::new();
        let mut in_stack = AHashSet::new();

        for &cell in &self.formulas {
            self.topological_sort(cell, &mut result, &mut visited, &mut in_stack);
        }

        let formulas: AHashSet<CellKey> = self.formulas.iter().copied().collect();
        result.retain(|cell| formulas.contains(cell));
        result
    }

    /// Topological sort helper (DFS over precedents)
    fn topological_sort(
        &self,
        cell: CellKey,
        result: &mut Vec<CellKey>,
        visited: &mut AHashSet<CellKey>,
        in_stack: &mut AHashSet<CellKey>,
    ) {
        if visited.contains(&cell) || in_stack.contains(&cell) {
            return;
        }

        in_stack.insert(cell);

        if let Some(precedents) = self.precedents.get(&cell) {
            let mut sorted: Vec<_> = precedents.iter().copied().collect();
            sorted.sort_unstable();
            for precedent in sorted {
                self.topological_sort(precedent, result, visited, in_stack);
            }
        }

        in_stack.remove(&cell);
        visited.insert(cell);
        result.push(cell);
    }

    /// Every cell that lies on a cycle, sorted row-major
    ///
    /// Uses Tarjan's strongly connected components: a cell is circular when
    /// its component has more than one member or it references itself.
    /// Cells that merely depend on a cycle are not included.
    pub fn circular_cells(&self) -> Vec<CellKey> {
        let mut tarjan = Tarjan::default();
        for &cell in &self.formulas {
            if !tarjan.index.contains_key(&cell) {
                tarjan.connect(self, cell);
            }
        }

        let mut cells = Vec::new();
        for component in tarjan.components {
            let self_loop = component.len() == 1
                && self
                    .precedents
                    .get(&component[0])
                    .map_or(false, |p| p.contains(&component[0]));
            if component.len() > 1 || self_loop {
                cells.extend(component);
            }
        }
        cells.sort_unstable();
        cells
    }
}

#[derive(Default)]
struct Tarjan {
    next: usize,
    index: AHashMap<CellKey, usize>,
    lowlink: AHashMap<CellKey, usize>,
    stack: Vec<CellKey>,
    on_stack: AHashSet<CellKey>,
    components: Vec<Vec<CellKey>>,
}

impl Tarjan {
    fn connect(&mut self, graph: &DependencyGraph, cell: CellKey) {
        self.index.insert(cell, self.next);
        self.lowlink.insert(cell, self.next);
        self.next += 1;
        self.stack.push(cell);
        self.on_stack.insert(cell);

        for precedent in graph.get_precedents(cell) {
            if !self.index.contains_key(&precedent) {
                self.connect(graph, precedent);
                let low = self.lowlink[&cell].min(self.lowlink[&precedent]);
                self.lowlink.insert(cell, low);
            } else if self.on_stack.contains(&precedent) {
                let low = self.lowlink[&cell].min(self.index[&precedent]);
                self.lowlink.insert(cell, low);
            }
        }

        if self.lowlink[&cell] == self.index[&cell] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(&member);
                component.push(member);
                if member == cell {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_core::Grid;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_dependency() {
        let mut graph = DependencyGraph::new();

        let a1 = CellKey::new(0, 0);
        let b1 = CellKey::new(0, 1);

        graph.add_dependency(a1, b1);
        graph.add_dependency(a1, b1);

        assert!(graph.get_precedents(b1).any(|c| c == a1));
        assert_eq!(graph.get_precedents(a1).count(), 0);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_from_grid_order() {
        let mut grid = Grid::new(3, 3);
        grid.set_formula("C1", "=B1+10").unwrap();
        grid.set_formula("B1", "=A1*2").unwrap();
        grid.set_value("A1", 10).unwrap();

        let graph = DependencyGraph::from_grid(&grid);
        assert_eq!(
            graph.calculation_order(),
            vec![CellKey::new(0, 1), CellKey::new(0, 2)]
        );
        assert!(graph.circular_cells().is_empty());
    }

    #[test]
    fn test_ranges_are_clipped() {
        let mut grid = Grid::new(3, 2);
        grid.set_formula("B1", "=SUM(A1:A100)").unwrap();

        let graph = DependencyGraph::from_grid(&grid);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_circular_cells_from_grid() {
        let mut grid = Grid::new(4, 2);
        grid.set_formula("A1", "=A1+1").unwrap();
        grid.set_formula("A2", "=A3").unwrap();
        grid.set_formula("A3", "=A2").unwrap();
        // Depends on a cycle but is not part of one
        grid.set_formula("A4", "=A3*2").unwrap();

        let graph = DependencyGraph::from_grid(&grid);
        assert_eq!(
            graph.circular_cells(),
            vec![CellKey::new(0, 0), CellKey::new(1, 0), CellKey::new(2, 0)]
        );
    }
}
