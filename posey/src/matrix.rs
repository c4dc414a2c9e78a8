use std::ops::Mul;

use crate::mirror::MirrorAxis;

/// A 4x4 world-space transform.
///
/// Rows are stored in order and points are treated as row vectors, so the
/// translation lives in the last row (flat indices 12, 13, 14). Composition
/// reads left to right: `a * b` applies `a` first, then `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub data: [[f64; 4]; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        data: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build a transform from 16 values in row-major order.
    pub fn from_row_major(values: &[f64; 16]) -> Self {
        let mut data = [[0.0; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            row.copy_from_slice(&values[i * 4..i * 4 + 4]);
        }
        Self { data }
    }

    /// Flatten to 16 values in row-major order.
    pub fn to_row_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for (i, row) in self.data.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(row);
        }
        out
    }

    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.data[3][0] = x;
        t.data[3][1] = y;
        t.data[3][2] = z;
        t
    }

    pub fn from_scale(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.data[0][0] = x;
        t.data[1][1] = y;
        t.data[2][2] = z;
        t
    }

    /// Rotation about the world Z axis, in radians.
    pub fn from_rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut t = Self::IDENTITY;
        t.data[0][0] = c;
        t.data[0][1] = s;
        t.data[1][0] = -s;
        t.data[1][1] = c;
        t
    }

    /// Rotation about the world Y axis, in radians.
    pub fn from_rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut t = Self::IDENTITY;
        t.data[0][0] = c;
        t.data[0][2] = -s;
        t.data[2][0] = s;
        t.data[2][2] = c;
        t
    }

    /// Reflection across the world plane orthogonal to `axis`.
    ///
    /// `MirrorAxis::None` yields the identity. The reflection acts on the
    /// whole world frame, not on an object-local symmetry plane.
    pub fn reflection(axis: MirrorAxis) -> Self {
        let mut t = Self::IDENTITY;
        if let Some(i) = axis.index() {
            t.data[i][i] = -1.0;
        }
        t
    }

    pub fn translation(&self) -> [f64; 3] {
        [self.data[3][0], self.data[3][1], self.data[3][2]]
    }

    /// Standard matrix product `self * rhs`.
    pub fn multiply(&self, rhs: &Transform) -> Transform {
        let a = &self.data;
        let b = &rhs.data;
        let mut c = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                c[i][j] = a[i][0] * b[0][j]
                    + a[i][1] * b[1][j]
                    + a[i][2] * b[2][j]
                    + a[i][3] * b[3][j];
            }
        }
        Transform { data: c }
    }

    /// Matrix inverse.
    ///
    /// Returns `None` when the matrix is singular, e.g. a transform captured
    /// with zero scale on one axis, or holds a non-finite value. Pivots are
    /// tested against [`PIVOT_EPSILON`] times the largest entry, so a tiny
    /// uniform scale is still invertible. Affine transforms invert their
    /// 3x3 part only, which keeps a large translation from masking it.
    pub fn inverse(&self) -> Option<Transform> {
        if !self.is_finite() {
            return None;
        }
        if !self.is_affine() {
            return gauss_jordan(self.data).map(|data| Transform { data });
        }

        let mut linear = [[0.0; 3]; 3];
        for (row, src) in linear.iter_mut().zip(&self.data) {
            row.copy_from_slice(&src[..3]);
        }
        let linear_inv = gauss_jordan(linear)?;

        // p' = p L + t, so p = p' L^-1 - t L^-1
        let t = self.translation();
        let mut inv = Self::IDENTITY;
        for i in 0..3 {
            inv.data[i][..3].copy_from_slice(&linear_inv[i]);
        }
        for j in 0..3 {
            inv.data[3][j] = -(t[0] * linear_inv[0][j]
                + t[1] * linear_inv[1][j]
                + t[2] * linear_inv[2][j]);
        }
        Some(inv)
    }

    /// Last column is `[0, 0, 0, 1]`.
    pub fn is_affine(&self) -> bool {
        self.data[0][3] == 0.0
            && self.data[1][3] == 0.0
            && self.data[2][3] == 0.0
            && self.data[3][3] == 1.0
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|v| v.is_finite())
    }

    /// Element-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Transform, eps: f64) -> bool {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

/// Pivots smaller than this fraction of the largest entry count as zero.
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Gauss-Jordan elimination with partial pivoting.
fn gauss_jordan<const N: usize>(mut a: [[f64; N]; N]) -> Option<[[f64; N]; N]> {
    let largest = a.iter().flatten().fold(0.0_f64, |m, v| m.max(v.abs()));
    let tolerance = PIVOT_EPSILON * largest;

    let mut inv = [[0.0; N]; N];
    for (i, row) in inv.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for col in 0..N {
        // Find pivot
        let mut max_val = a[col][col].abs();
        let mut max_row = col;
        for row in (col + 1)..N {
            let v = a[row][col].abs();
            if v > max_val {
                max_val = v;
                max_row = row;
            }
        }
        if max_val <= tolerance {
            return None;
        }

        if max_row != col {
            a.swap(col, max_row);
            inv.swap(col, max_row);
        }

        let pivot = a[col][col];
        for c in 0..N {
            a[col][c] /= pivot;
            inv[col][c] /= pivot;
        }

        // Eliminate above and below
        for row in 0..N {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for c in 0..N {
                a[row][c] -= factor * a[col][c];
                inv[row][c] -= factor * inv[col][c];
            }
        }
    }

    Some(inv)
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.multiply(&rhs)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        self.multiply(rhs)
    }
}
