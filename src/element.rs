//! Two-node axial bar element expressed directly in the global frame.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use crate::geometry::{Force, Point};

/// 6×6 element matrix ordered `[uxI, uyI, uzI, uxJ, uyJ, uzJ]`.
pub type ElementMatrix = SMatrix<f64, 6, 6>;

/// Six-entry element vector in the same dof order as [`ElementMatrix`].
pub type ElementVector = SVector<f64, 6>;

/// Geometry of a bar between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarElement {
    /// Distance between the end points.
    length: f64,
    /// Direction cosines `(l, m, n)` from the first to the second end.
    direction: Vector3<f64>,
}

impl BarElement {
    /// Build the element from its end points, or `None` when they coincide.
    #[must_use]
    pub fn new(start: Point, end: Point) -> Option<Self> {
        let delta = start.delta_to(end);
        let length = delta.norm();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some(Self {
            length,
            direction: delta / length,
        })
    }

    /// Member length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Unit vector along the member axis.
    #[must_use]
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    /// Global stiffness matrix `EA/L · [[D, -D], [-D, D]]` with `D = c cᵀ`.
    #[must_use]
    pub fn stiffness(&self, axial_rigidity: f64) -> ElementMatrix {
        let block: Matrix3<f64> =
            self.direction * self.direction.transpose() * (axial_rigidity / self.length);
        let mut matrix = ElementMatrix::zeros();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&block);
        matrix.fixed_view_mut::<3, 3>(3, 3).copy_from(&block);
        matrix.fixed_view_mut::<3, 3>(0, 3).copy_from(&(-block));
        matrix.fixed_view_mut::<3, 3>(3, 0).copy_from(&(-block));
        matrix
    }

    /// Lumped mass matrix: half the bar mass on every translational dof.
    #[must_use]
    pub fn lumped_mass(&self, mass_per_length: f64) -> ElementMatrix {
        ElementMatrix::from_diagonal_element(mass_per_length * self.length / 2.0)
    }

    /// End loads equivalent to a uniform load `w` per unit length: each end
    /// carries `w·L/2`.
    #[must_use]
    pub fn equivalent_nodal_load(&self, intensity: Force) -> ElementVector {
        let half = intensity.to_vector() * (self.length / 2.0);
        ElementVector::new(half.x, half.y, half.z, half.x, half.y, half.z)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{force, point};

    #[test]
    fn coincident_points_have_no_element() {
        assert!(BarElement::new(point(1.0, 2.0, 3.0), point(1.0, 2.0, 3.0)).is_none());
    }

    #[test]
    fn direction_cosines_are_normalised() {
        let bar = BarElement::new(point(0.0, 0.0, 0.0), point(40.0, 30.0, 0.0)).expect("bar");
        assert_relative_eq!(bar.length(), 50.0);
        assert_relative_eq!(bar.direction(), Vector3::new(0.8, 0.6, 0.0));
    }

    #[test]
    fn stiffness_has_rank_one_block_structure() {
        let bar = BarElement::new(point(0.0, 0.0, 0.0), point(40.0, 30.0, 0.0)).expect("bar");
        let ea = 29.5e6;
        let k = bar.stiffness(ea);
        let scale = ea / 50.0;

        assert_relative_eq!(k[(0, 0)], 0.64 * scale, max_relative = 1.0e-12);
        assert_relative_eq!(k[(0, 1)], 0.48 * scale, max_relative = 1.0e-12);
        assert_relative_eq!(k[(1, 1)], 0.36 * scale, max_relative = 1.0e-12);
        assert_relative_eq!(k[(0, 3)], -0.64 * scale, max_relative = 1.0e-12);
        assert_relative_eq!(k[(1, 3)], -0.48 * scale, max_relative = 1.0e-12);
        assert_eq!(k[(2, 2)], 0.0);
        assert_eq!(k, k.transpose());

        // A rigid translation produces no end forces.
        let rigid = ElementVector::new(1.0, -2.0, 0.5, 1.0, -2.0, 0.5);
        assert_relative_eq!((k * rigid).norm(), 0.0, epsilon = 1.0e-6);
    }

    #[test]
    fn lumped_mass_splits_bar_mass_between_ends() {
        let bar = BarElement::new(point(0.0, 0.0, 0.0), point(0.0, 0.0, 4.0)).expect("bar");
        let m = bar.lumped_mass(3.0);
        for dof in 0..6 {
            assert_relative_eq!(m[(dof, dof)], 6.0);
        }
        assert_relative_eq!(m.sum(), 36.0);
    }

    #[test]
    fn uniform_load_is_shared_equally() {
        let bar = BarElement::new(point(0.0, 0.0, 0.0), point(3.0, 4.0, 0.0)).expect("bar");
        let load = bar.equivalent_nodal_load(force(2.0, -1.0, 0.0));
        assert_eq!(load, ElementVector::new(5.0, -2.5, 0.0, 5.0, -2.5, 0.0));
    }
}
