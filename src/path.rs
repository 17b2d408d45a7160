use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An enemy route: a polyline walked from the first point to the last.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Vec2>,
}

impl Path {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Index of the final waypoint. Reaching it means the enemy got through.
    pub fn last_waypoint(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn start(&self) -> Vec2 {
        self.points.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Endpoints of the segment leaving `waypoint`
    pub fn segment(&self, waypoint: usize) -> Option<(Vec2, Vec2)> {
        let start = *self.points.get(waypoint)?;
        let end = *self.points.get(waypoint + 1)?;
        Some((start, end))
    }

    pub fn segment_length(&self, waypoint: usize) -> f32 {
        self.segment(waypoint)
            .map_or(0.0, |(start, end)| start.distance(end))
    }

    /// Point at fraction `t` of the segment leaving `waypoint`, clamped to the path
    pub fn sample(&self, waypoint: usize, t: f32) -> Vec2 {
        if self.points.len() < 2 {
            return self.start();
        }
        let index = waypoint.min(self.points.len() - 2);
        let start = self.points[index];
        let end = self.points[index + 1];
        start.lerp(end, t.clamp(0.0, 1.0))
    }

    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

/// Every path of the current level, indexed by `EnemyStats::path_index`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathContext {
    pub paths: Vec<Path>,
}

impl PathContext {
    pub fn new(paths: Vec<Path>) -> Self {
        Self { paths }
    }

    /// Build paths from flat tile-coordinate lists `[x0, y0, x1, y1, ...]`.
    ///
    /// Each tile becomes the centre of its cell. A trailing odd value is ignored.
    pub fn from_tiles(tiles: &[Vec<i32>], tile_size: f32) -> Self {
        let half = tile_size * 0.5;
        let paths = tiles
            .iter()
            .map(|flat| {
                let points = flat
                    .chunks_exact(2)
                    .map(|pair| {
                        Vec2::new(
                            pair[0] as f32 * tile_size + half,
                            pair[1] as f32 * tile_size + half,
                        )
                    })
                    .collect();
                Path::new(points)
            })
            .collect();
        Self { paths }
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
