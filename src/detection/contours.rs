use std::collections::HashMap;

use image::GrayImage;
use imageproc::point::Point;

use crate::models::Contour;

/// Isovalue separating unset (0.0) from set (1.0) mask pixels
const ISO_LEVEL: f32 = 0.5;

/// Identifies one pixel-grid edge in doubled coordinates: a horizontal edge
/// between (x, y) and (x + 1, y) is (2x + 1, 2y), a vertical edge between
/// (x, y) and (x, y + 1) is (2x, 2y + 1).
type EdgeKey = (u32, u32);

#[derive(Debug, Clone, Copy)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Crossed cell sides for each corner configuration (bit 1 top-left,
/// 2 top-right, 4 bottom-right, 8 bottom-left). In the two saddle cases the
/// set corners are cut off separately, so diagonal neighbours never merge.
fn cell_segments(case: u8) -> &'static [(Side, Side)] {
    use Side::*;
    match case {
        1 | 14 => &[(Left, Top)],
        2 | 13 => &[(Top, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Right, Bottom)],
        5 => &[(Left, Top), (Right, Bottom)],
        6 | 9 => &[(Top, Bottom)],
        7 | 8 => &[(Left, Bottom)],
        10 => &[(Top, Right), (Left, Bottom)],
        _ => &[],
    }
}

fn edge_key(x: u32, y: u32, side: Side) -> EdgeKey {
    match side {
        Side::Top => (2 * x + 1, 2 * y),
        Side::Bottom => (2 * x + 1, 2 * y + 2),
        Side::Left => (2 * x, 2 * y + 1),
        Side::Right => (2 * x + 2, 2 * y + 1),
    }
}

struct Grid<'a> {
    mask: &'a GrayImage,
}

impl Grid<'_> {
    fn value(&self, x: u32, y: u32) -> f32 {
        self.mask.get_pixel(x, y)[0] as f32 / 255.0
    }

    fn is_set(&self, x: u32, y: u32) -> bool {
        self.value(x, y) > ISO_LEVEL
    }

    /// Point where the isoline crosses the given edge
    fn crossing(&self, (kx, ky): EdgeKey) -> Point<f32> {
        let (x0, y0) = (kx / 2, ky / 2);
        let (x1, y1) = if kx % 2 == 1 { (x0 + 1, y0) } else { (x0, y0 + 1) };
        let a = self.value(x0, y0);
        let b = self.value(x1, y1);
        let t = (ISO_LEVEL - a) / (b - a);
        Point::new(
            x0 as f32 + t * (x1 as f32 - x0 as f32),
            y0 as f32 + t * (y1 as f32 - y0 as f32),
        )
    }
}

/// Trace region boundaries in a mask with marching squares at isovalue 0.5.
///
/// Regions touching the image border yield open contours; all others are
/// closed, with the first point repeated at the end. Contours come back in
/// raster order of the first cell each one passes through.
pub fn find_contours(mask: &GrayImage) -> Vec<Contour> {
    let (width, height) = mask.dimensions();
    if width < 2 || height < 2 {
        return Vec::new();
    }
    let grid = Grid { mask };

    // Segments in raster order of their cells
    let mut segments: Vec<(EdgeKey, EdgeKey)> = Vec::new();
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let case = grid.is_set(x, y) as u8
                | (grid.is_set(x + 1, y) as u8) << 1
                | (grid.is_set(x + 1, y + 1) as u8) << 2
                | (grid.is_set(x, y + 1) as u8) << 3;
            for &(from, to) in cell_segments(case) {
                segments.push((edge_key(x, y, from), edge_key(x, y, to)));
            }
        }
    }

    // Each edge is shared by at most two cells, hence at most two segments
    let mut adjacency: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (idx, &(a, b)) in segments.iter().enumerate() {
        adjacency.entry(a).or_default().push(idx);
        adjacency.entry(b).or_default().push(idx);
    }

    let mut visited = vec![false; segments.len()];
    let mut traced: Vec<(usize, Contour)> = Vec::new();

    // Open chains first, starting from an end that lies on the image border
    for idx in 0..segments.len() {
        if visited[idx] {
            continue;
        }
        let (a, b) = segments[idx];
        let start = if adjacency[&a].len() == 1 {
            Some(a)
        } else if adjacency[&b].len() == 1 {
            Some(b)
        } else {
            None
        };
        if let Some(start) = start {
            traced.push(trace(&grid, &segments, &adjacency, &mut visited, idx, start));
        }
    }

    // Whatever is left forms closed loops
    for idx in 0..segments.len() {
        if !visited[idx] {
            let start = segments[idx].0;
            traced.push(trace(&grid, &segments, &adjacency, &mut visited, idx, start));
        }
    }

    // Segment indices follow cell raster order
    traced.sort_by_key(|&(first_cell, _)| first_cell);
    traced.into_iter().map(|(_, contour)| contour).collect()
}

fn trace(
    grid: &Grid<'_>,
    segments: &[(EdgeKey, EdgeKey)],
    adjacency: &HashMap<EdgeKey, Vec<usize>>,
    visited: &mut [bool],
    first: usize,
    start: EdgeKey,
) -> (usize, Contour) {
    let mut points = vec![grid.crossing(start)];
    let mut current = first;
    let mut at = start;
    let mut lowest = first;

    loop {
        visited[current] = true;
        lowest = lowest.min(current);
        let (a, b) = segments[current];
        let next_key = if a == at { b } else { a };
        points.push(grid.crossing(next_key));

        let next = adjacency[&next_key]
            .iter()
            .copied()
            .find(|&s| s != current && !visited[s]);
        match next {
            Some(s) => {
                current = s;
                at = next_key;
            }
            None => break,
        }
    }

    (lowest, Contour::new(points))
}
