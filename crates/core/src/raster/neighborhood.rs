//! Pixel neighborhoods and connectivity

/// 4-connected neighbor offsets (N, W, E, S)
pub const ROOK_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// 8-connected neighbor offsets in row-major order
pub const QUEEN_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Defines a neighborhood pattern around a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// 3x3 neighborhood (8 neighbors + center)
    Queen3x3,
    /// 3x3 without corners (4 neighbors + center)
    Rook3x3,
    /// Square window of given radius (side = 2*radius + 1)
    Square(usize),
}

impl Neighborhood {
    /// Square window with the given odd side length
    pub fn window(size: usize) -> Self {
        match size {
            3 => Neighborhood::Queen3x3,
            _ => Neighborhood::Square(size / 2),
        }
    }

    /// Get the radius of the neighborhood
    pub fn radius(&self) -> usize {
        match self {
            Neighborhood::Queen3x3 | Neighborhood::Rook3x3 => 1,
            Neighborhood::Square(r) => *r,
        }
    }

    /// Check if a relative position is within this neighborhood
    pub fn contains(&self, dr: isize, dc: isize) -> bool {
        match self {
            Neighborhood::Queen3x3 => dr.abs() <= 1 && dc.abs() <= 1,
            Neighborhood::Rook3x3 => {
                (dr.abs() <= 1 && dc == 0) || (dr == 0 && dc.abs() <= 1)
            }
            Neighborhood::Square(r) => {
                let r = *r as isize;
                dr.abs() <= r && dc.abs() <= r
            }
        }
    }

    /// Relative positions in this neighborhood, row-major
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let r = self.radius() as isize;
        let mut offsets = Vec::new();

        for dr in -r..=r {
            for dc in -r..=r {
                if self.contains(dr, dc) {
                    offsets.push((dr, dc));
                }
            }
        }

        offsets
    }

    /// Get offsets excluding the center pixel
    pub fn offsets_no_center(&self) -> Vec<(isize, isize)> {
        self.offsets()
            .into_iter()
            .filter(|&(dr, dc)| dr != 0 || dc != 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighborhood_offsets() {
        let queen = Neighborhood::Queen3x3;
        assert_eq!(queen.offsets().len(), 9);
        assert_eq!(queen.offsets_no_center(), QUEEN_OFFSETS.to_vec());

        let rook = Neighborhood::Rook3x3;
        assert_eq!(rook.offsets().len(), 5);
        assert_eq!(rook.offsets_no_center(), ROOK_OFFSETS.to_vec());

        assert_eq!(Neighborhood::Square(2).offsets().len(), 25);
    }

    #[test]
    fn test_window_sizes() {
        assert_eq!(Neighborhood::window(3), Neighborhood::Queen3x3);
        assert_eq!(Neighborhood::window(5), Neighborhood::Square(2));
        assert_eq!(Neighborhood::window(7).radius(), 3);
    }
}
