use glam::Vec2;
use std::collections::HashMap;

use crate::store::Entity;

/// Uniform grid hashing positions to buckets of entity handles.
///
/// The grid is rebuilt from scratch every frame, so there is no removal.
/// Buckets keep insertion order.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<Entity>>,
    len: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_of(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    pub fn insert(&mut self, entity: Entity, position: Vec2) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(entity);
        self.len += 1;
    }

    /// Visit every handle in the cell containing `position`
    pub fn query(&self, position: Vec2, mut visitor: impl FnMut(Entity)) {
        if let Some(bucket) = self.cells.get(&self.cell_of(position)) {
            bucket.iter().copied().for_each(&mut visitor);
        }
    }

    /// Visit every handle in the cells overlapping the square that bounds the circle,
    /// row by row. Callers still have to check the actual distance.
    pub fn query_radius(&self, position: Vec2, radius: f32, mut visitor: impl FnMut(Entity)) {
        let radius = radius.max(0.0);
        let (min_x, min_y) = self.cell_of(position - Vec2::splat(radius));
        let (max_x, max_y) = self.cell_of(position + Vec2::splat(radius));

        let width = (i64::from(max_x) - i64::from(min_x) + 1) as u64;
        let height = (i64::from(max_y) - i64::from(min_y) + 1) as u64;
        if width.saturating_mul(height) > self.cells.len() as u64 {
            // Fewer occupied cells than cells in range: walk the buckets instead
            let mut occupied: Vec<(i32, i32)> = self
                .cells
                .keys()
                .copied()
                .filter(|&(x, y)| (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y))
                .collect();
            occupied.sort_unstable_by_key(|&(x, y)| (y, x));
            for cell in occupied {
                if let Some(bucket) = self.cells.get(&cell) {
                    bucket.iter().copied().for_each(&mut visitor);
                }
            }
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if let Some(bucket) = self.cells.get(&(x, y)) {
                    bucket.iter().copied().for_each(&mut visitor);
                }
            }
        }
    }

    /// Number of handles inserted since the last clear
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity {
            index,
            generation: 0,
        }
    }

    fn collect_query(grid: &SpatialGrid, position: Vec2) -> Vec<Entity> {
        let mut found = Vec::new();
        grid.query(position, |entity| found.push(entity));
        found
    }

    #[test]
    fn test_query_visits_same_cell_in_insertion_order() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(entity(3), Vec2::new(10.0, 10.0));
        grid.insert(entity(1), Vec2::new(60.0, 5.0));
        grid.insert(entity(2), Vec2::new(70.0, 10.0));

        assert_eq!(collect_query(&grid, Vec2::new(32.0, 32.0)), vec![entity(3), entity(1)]);
        assert_eq!(collect_query(&grid, Vec2::new(100.0, 10.0)), vec![entity(2)]);
        assert!(collect_query(&grid, Vec2::new(500.0, 500.0)).is_empty());
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell_count(), 2);
    }

    #[test]
    fn test_negative_positions_floor_into_their_own_cell() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(entity(1), Vec2::new(-1.0, 1.0));
        assert_eq!(grid.cell_of(Vec2::new(-1.0, 1.0)), (-1, 0));
        assert!(collect_query(&grid, Vec2::new(1.0, 1.0)).is_empty());
        assert_eq!(collect_query(&grid, Vec2::new(-10.0, 10.0)), vec![entity(1)]);
    }

    #[test]
    fn test_query_radius_crosses_cell_borders() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(entity(1), Vec2::new(60.0, 10.0));
        grid.insert(entity(2), Vec2::new(70.0, 10.0));
        grid.insert(entity(3), Vec2::new(400.0, 10.0));

        let mut found = Vec::new();
        grid.query_radius(Vec2::new(60.0, 10.0), 20.0, |entity| found.push(entity));
        assert_eq!(found, vec![entity(1), entity(2)]);
    }

    #[test]
    fn test_query_radius_with_unbounded_range_walks_occupied_cells() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(entity(1), Vec2::new(5000.0, 900.0));
        grid.insert(entity(2), Vec2::new(-3000.0, -20.0));
        grid.insert(entity(3), Vec2::new(100.0, 900.0));

        let mut found = Vec::new();
        grid.query_radius(Vec2::ZERO, f32::INFINITY, |entity| found.push(entity));
        assert_eq!(found, vec![entity(2), entity(3), entity(1)]);

        let mut found = Vec::new();
        grid.query_radius(Vec2::ZERO, 64000.0, |entity| found.push(entity));
        assert_eq!(found, vec![entity(2), entity(3), entity(1)]);

        let mut found = Vec::new();
        grid.query_radius(Vec2::ZERO, f32::NAN, |entity| found.push(entity));
        assert!(found.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut grid = SpatialGrid::new(32.0);
        grid.insert(entity(1), Vec2::ZERO);
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.cell_count(), 0);
        assert!(collect_query(&grid, Vec2::ZERO).is_empty());
    }
}
