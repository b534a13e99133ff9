//! Geometry types shared by the pipeline stages

use std::fmt;
use std::str::FromStr;

/// Rectangular region of interest with half-open row and column ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Roi {
    pub const fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    pub fn rows(&self) -> usize {
        self.row_end.saturating_sub(self.row_start)
    }

    pub fn cols(&self) -> usize {
        self.col_end.saturating_sub(self.col_start)
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    /// True when the region lies entirely inside a `rows` x `cols` frame.
    pub fn fits(&self, rows: usize, cols: usize) -> bool {
        !self.is_empty() && self.row_end <= rows && self.col_end <= cols
    }

    /// Moves a centroid from region-local to frame coordinates.
    pub fn to_global(&self, local: Centroid) -> Centroid {
        Centroid {
            x: local.x + self.col_start as f64,
            y: local.y + self.row_start as f64,
        }
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{},{}:{}",
            self.row_start, self.row_end, self.col_start, self.col_end
        )
    }
}

/// Parses `"row_start:row_end,col_start:col_end"`.
impl FromStr for Roi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rows, cols) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'r0:r1,c0:c1', got '{s}'"))?;

        let range = |part: &str| -> Result<(usize, usize), String> {
            let (start, end) = part
                .split_once(':')
                .ok_or_else(|| format!("expected 'start:end', got '{part}'"))?;
            let start = start
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("bad range start '{start}': {e}"))?;
            let end = end
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("bad range end '{end}': {e}"))?;
            Ok((start, end))
        };

        let (row_start, row_end) = range(rows)?;
        let (col_start, col_end) = range(cols)?;
        Ok(Roi::new(row_start, row_end, col_start, col_end))
    }
}

/// Sub-pixel position; `x` runs along columns, `y` along rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn distance(&self, other: &Centroid) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Displacement of the second spot relative to the first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearVector {
    pub dx: f64,
    pub dy: f64,
}

impl ShearVector {
    pub fn between(first: Centroid, second: Centroid) -> Self {
        Self {
            dx: second.x - first.x,
            dy: second.y - first.y,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}
