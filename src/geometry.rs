//! Three-component value types shared by the model, the solver and the results.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Declare a Cartesian triple in the global frame with its conversions.
macro_rules! cartesian_triple {
    ($(#[$meta:meta])* $name:ident, $helper:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[doc = concat!("X ", $what, ".")]
            pub x: f64,
            #[doc = concat!("Y ", $what, ".")]
            pub y: f64,
            #[doc = concat!("Z ", $what, ".")]
            pub z: f64,
        }

        impl $name {
            #[doc = concat!("Build a [`", stringify!($name), "`] from its X, Y and Z ", $what, "s.")]
            #[must_use]
            pub const fn new(x: f64, y: f64, z: f64) -> Self {
                Self { x, y, z }
            }

            /// Column vector `[x, y, z]`.
            #[must_use]
            pub fn to_vector(self) -> Vector3<f64> {
                Vector3::new(self.x, self.y, self.z)
            }

            /// Components indexed by axis, 0 = X.
            #[must_use]
            pub const fn components(self) -> [f64; 3] {
                [self.x, self.y, self.z]
            }
        }

        impl From<Vector3<f64>> for $name {
            fn from(vector: Vector3<f64>) -> Self {
                Self::new(vector[0], vector[1], vector[2])
            }
        }

        #[doc = concat!("Shorthand for [`", stringify!($name), "::new`].")]
        #[must_use]
        pub const fn $helper(x: f64, y: f64, z: f64) -> $name {
            $name::new(x, y, z)
        }
    };
}

cartesian_triple!(
    /// Node position.
    ///
    /// ```
    /// let origin = truss3d::point(0.0, 0.0, 0.0);
    /// assert_eq!(origin.x, 0.0);
    /// ```
    Point,
    point,
    "coordinate"
);

cartesian_triple!(
    /// Force in the global frame. Distributed member loads use it as a force
    /// per unit length.
    ///
    /// ```
    /// let load = truss3d::force(1.0, 0.0, -5.0) + truss3d::force(1.0, 0.0, 0.0);
    /// assert_eq!(load.components(), [2.0, 0.0, -5.0]);
    /// ```
    Force,
    force,
    "component"
);

cartesian_triple!(
    /// Translation of a node.
    Displacement,
    displacement,
    "translation"
);

impl Point {
    /// Vector from `self` to `other`.
    #[must_use]
    pub fn delta_to(self, other: Point) -> Vector3<f64> {
        other.to_vector() - self.to_vector()
    }
}

impl std::ops::Add for Force {
    type Output = Force;

    fn add(self, rhs: Force) -> Force {
        Force::from(self.to_vector() + rhs.to_vector())
    }
}

impl Displacement {
    /// Read the triple starting at `offset` of a solution vector.
    #[must_use]
    pub fn from_slice(values: &[f64], offset: usize) -> Self {
        Self::new(values[offset], values[offset + 1], values[offset + 2])
    }
}
