use tilebrot_core::Viewport;

/// One cell of a `rows × cols` grid over the viewport.
///
/// Pixel edges come from integer division, so tiles differ by at most one
/// pixel in each direction and may be empty when there are more columns
/// than pixels. Complex bounds are derived from the parent viewport's
/// pixel mapping so neighbouring tiles share their edges exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Pixel x of the top-left corner.
    pub start_x: u32,
    /// Pixel y of the top-left corner.
    pub start_y: u32,
    pub width: u32,
    pub height: u32,
    pub min_re: f64,
    pub min_im: f64,
    pub max_re: f64,
    pub max_im: f64,
}

impl Tile {
    /// Number of pixels in this tile.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Pixel edge `index` of `parts` equal splits of `extent`.
fn edge(index: u32, extent: u32, parts: u32) -> u32 {
    (index as u64 * extent as u64 / parts as u64) as u32
}

/// Partition the viewport into `rows × cols` tiles, listed row-major.
pub fn build_tile_grid(vp: &Viewport, rows: u32, cols: u32) -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(rows as usize * cols as usize);
    for row in 0..rows {
        let start_y = edge(row, vp.height(), rows);
        let end_y = edge(row + 1, vp.height(), rows);
        for col in 0..cols {
            let start_x = edge(col, vp.width(), cols);
            let end_x = edge(col + 1, vp.width(), cols);
            tiles.push(Tile {
                start_x,
                start_y,
                width: end_x - start_x,
                height: end_y - start_y,
                min_re: vp.min_re() + start_x as f64 * vp.step_re(),
                min_im: vp.min_im() + start_y as f64 * vp.step_im(),
                max_re: vp.min_re() + end_x as f64 * vp.step_re(),
                max_im: vp.min_im() + end_y as f64 * vp.step_im(),
            });
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(width: u32, height: u32, tiles: &[Tile]) {
        let mut covered = vec![false; (width * height) as usize];
        for tile in tiles {
            for py in tile.start_y..tile.start_y + tile.height {
                for px in tile.start_x..tile.start_x + tile.width {
                    let idx = py as usize * width as usize + px as usize;
                    assert!(!covered[idx], "pixel ({px}, {py}) covered twice");
                    covered[idx] = true;
                }
            }
        }
        assert!(covered.iter().all(|&c| c), "all pixels must be covered");
    }

    #[test]
    fn tile_grid_covers_viewport_exactly() {
        for (w, h) in [(64, 48), (101, 37), (7, 5)] {
            let vp = Viewport::new(w, h);
            for rows in 1..=6 {
                for cols in 1..=6 {
                    let tiles = build_tile_grid(&vp, rows, cols);
                    assert_eq!(tiles.len(), (rows * cols) as usize);
                    let total: usize = tiles.iter().map(Tile::pixel_count).sum();
                    assert_eq!(total, (w * h) as usize);
                    assert_exact_cover(w, h, &tiles);
                }
            }
        }
    }

    #[test]
    fn uneven_split_uses_floor_division() {
        let vp = Viewport::new(10, 10);
        let tiles = build_tile_grid(&vp, 1, 3);
        let widths: Vec<u32> = tiles.iter().map(|t| t.width).collect();
        assert_eq!(widths, [3, 3, 4]);
        assert_eq!(tiles[1].start_x, 3);
        assert_eq!(tiles[2].start_x, 6);
    }

    #[test]
    fn more_columns_than_pixels_gives_empty_tiles() {
        let vp = Viewport::new(3, 2);
        let tiles = build_tile_grid(&vp, 1, 5);
        assert!(tiles.iter().any(|t| t.width == 0));
        assert_exact_cover(3, 2, &tiles);
    }

    #[test]
    fn single_tile_matches_viewport() {
        let vp = Viewport::new(64, 48);
        let tiles = build_tile_grid(&vp, 1, 1);
        let t = tiles[0];
        assert_eq!((t.start_x, t.start_y, t.width, t.height), (0, 0, 64, 48));
        assert_eq!(t.min_re, vp.min_re());
        assert_eq!(t.min_im, vp.min_im());
        assert!((t.max_re - vp.max_re()).abs() < 1e-12);
        assert!((t.max_im - vp.max_im()).abs() < 1e-12);
    }

    #[test]
    fn neighbouring_tiles_share_edges() {
        let vp = Viewport::new(64, 48);
        let tiles = build_tile_grid(&vp, 3, 4);
        for row in 0..3 {
            for col in 0..3 {
                let left = tiles[row * 4 + col];
                let right = tiles[row * 4 + col + 1];
                assert_eq!(left.max_re, right.min_re);
            }
        }
        for col in 0..4 {
            assert_eq!(tiles[col].max_im, tiles[4 + col].min_im);
        }
    }
}
