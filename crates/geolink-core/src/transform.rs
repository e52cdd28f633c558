//! Homogeneous transforms and Euler angle conversion
//!
//! Rotations are keyed by the usual four-letter axis conventions: the first letter
//! is `s` (static frame, extrinsic) or `r` (rotating frame, intrinsic), followed by
//! the three rotation axes, e.g. `"sxyz"` or `"rzyx"`. All 24 conventions are
//! supported. `sxyz` rotates about x, then y, then z of the parent frame.
//!
//! Degree/radian conversion is never applied inside composition; callers convert
//! at the boundary with [`AngleUnit`].

use std::fmt;
use std::str::FromStr;

use glam::{DMat3, DMat4, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

use crate::constants::GIMBAL_EPSILON;

/// Next axis in cyclic order, padded so `i + parity` and `i + 1 - parity` stay in range
const NEXT_AXIS: [usize; 4] = [1, 2, 0, 1];

const AXIS_NAMES: [char; 3] = ['x', 'y', 'z'];

/// Euler axis convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EulerOrder {
    first_axis: usize,
    parity: bool,
    repetition: bool,
    rotating: bool,
}

impl EulerOrder {
    /// Static frame, rotate about x, then y, then z
    pub const SXYZ: Self = Self {
        first_axis: 0,
        parity: false,
        repetition: false,
        rotating: false,
    };

    /// Every supported convention
    pub const ALL: [&'static str; 24] = [
        "sxyz", "sxyx", "sxzy", "sxzx", "syzx", "syzy", "syxz", "syxy", "szxy", "szxz", "szyx",
        "szyz", "rzyx", "rxyx", "ryzx", "rxzx", "rxzy", "ryzy", "rzxy", "ryxy", "ryxz", "rzxz",
        "rxyz", "rzyz",
    ];

    /// Whether angles are applied in the rotating (intrinsic) frame
    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    fn axes(&self) -> (usize, usize, usize) {
        let i = self.first_axis;
        let parity = usize::from(self.parity);
        (i, NEXT_AXIS[i + parity], NEXT_AXIS[i + 1 - parity])
    }

    /// Axes in the order the angles are given, as spelled in the key
    fn key_axes(&self) -> [usize; 3] {
        let (i, j, k) = self.axes();
        let mut axes = [i, j, if self.repetition { i } else { k }];
        if self.rotating {
            axes.reverse();
        }
        axes
    }

    /// Matching glam rotation sequence: `s` keys are extrinsic, `r` keys intrinsic
    pub fn euler_rot(&self) -> EulerRot {
        use EulerRot::*;

        let [extrinsic, intrinsic] = match self.key_axes() {
            [0, 1, 2] => [XYZEx, XYZ],
            [0, 2, 1] => [XZYEx, XZY],
            [1, 0, 2] => [YXZEx, YXZ],
            [1, 2, 0] => [YZXEx, YZX],
            [2, 0, 1] => [ZXYEx, ZXY],
            [2, 1, 0] => [ZYXEx, ZYX],
            [0, 1, _] => [XYXEx, XYX],
            [0, 2, _] => [XZXEx, XZX],
            [1, 0, _] => [YXYEx, YXY],
            [1, 2, _] => [YZYEx, YZY],
            [2, 0, _] => [ZXZEx, ZXZ],
            _ => [ZYZEx, ZYZ],
        };
        if self.rotating { intrinsic } else { extrinsic }
    }
}

impl Default for EulerOrder {
    fn default() -> Self {
        Self::SXYZ
    }
}

fn axis_index(c: char) -> Option<usize> {
    AXIS_NAMES.iter().position(|&name| name == c)
}

impl FromStr for EulerOrder {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || TransformError::UnknownAxisOrder(s.to_string());

        let mut chars = s.chars();
        let rotating = match chars.next() {
            Some('s') => false,
            Some('r') => true,
            _ => return Err(unknown()),
        };

        let axes: Vec<usize> = chars.map(axis_index).collect::<Option<_>>().ok_or_else(unknown)?;
        let [mut first, second, mut third] = <[usize; 3]>::try_from(axes).map_err(|_| unknown())?;
        // A rotating convention is the static one read backwards
        if rotating {
            std::mem::swap(&mut first, &mut third);
        }
        if first == second || second == third {
            return Err(unknown());
        }

        Ok(Self {
            first_axis: first,
            parity: second != NEXT_AXIS[first],
            repetition: third == first,
            rotating,
        })
    }
}

impl fmt::Display for EulerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.rotating { 'r' } else { 's' })?;
        for axis in self.key_axes() {
            write!(f, "{}", AXIS_NAMES[axis])?;
        }
        Ok(())
    }
}

impl TryFrom<String> for EulerOrder {
    type Error = TransformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EulerOrder> for String {
    fn from(order: EulerOrder) -> Self {
        order.to_string()
    }
}

/// Unit of the Euler angles at the input/output boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    /// Convert angles given in this unit to radians
    pub fn to_radians(self, angles: DVec3) -> DVec3 {
        match self {
            AngleUnit::Radians => angles,
            AngleUnit::Degrees => DVec3::new(
                angles.x.to_radians(),
                angles.y.to_radians(),
                angles.z.to_radians(),
            ),
        }
    }

    /// Convert radians to this unit
    pub fn from_radians(self, angles: DVec3) -> DVec3 {
        match self {
            AngleUnit::Radians => angles,
            AngleUnit::Degrees => DVec3::new(
                angles.x.to_degrees(),
                angles.y.to_degrees(),
                angles.z.to_degrees(),
            ),
        }
    }
}

/// Pose (translation and Euler rotation)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: DVec3,
    pub rotation: DVec3,
}

impl Pose {
    pub fn new(translation: DVec3, rotation: DVec3) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Build the homogeneous transform, reading rotation in `unit`
    pub fn to_mat4(&self, order: EulerOrder, unit: AngleUnit) -> DMat4 {
        transform(self.translation, unit.to_radians(self.rotation), order)
    }

    /// Decompose a rigid transform, reporting rotation in `unit`
    pub fn from_mat4(matrix: &DMat4, order: EulerOrder, unit: AngleUnit) -> Self {
        Self {
            translation: translation_of(matrix),
            rotation: unit.from_radians(euler_from_matrix(matrix, order)),
        }
    }
}

fn rows_of(matrix: &DMat3) -> [[f64; 3]; 3] {
    matrix.transpose().to_cols_array_2d()
}

/// Rotation matrix for Euler angles (radians)
pub fn euler_matrix(angles: DVec3, order: EulerOrder) -> DMat3 {
    DMat3::from_euler(order.euler_rot(), angles.x, angles.y, angles.z)
}

/// Homogeneous transform of the child frame in its parent: rotation, then translation
pub fn transform(translation: DVec3, angles: DVec3, order: EulerOrder) -> DMat4 {
    DMat4::from_translation(translation) * DMat4::from_mat3(euler_matrix(angles, order))
}

/// Absolute transform of a child: the parent pre-multiplies the local transform
pub fn compose(parent: &DMat4, local: &DMat4) -> DMat4 {
    *parent * *local
}

/// Translation part (last column) of a homogeneous transform
pub fn translation_of(matrix: &DMat4) -> DVec3 {
    matrix.w_axis.truncate()
}

/// Euler angles (radians) of the rotation part, inverse of [`euler_matrix`]
///
/// When the pivot is saturated (gimbal lock) the two outer angles are not
/// independent; the third angle is fixed to zero and the first one carries the
/// whole rotation. `DMat3::to_euler` splits the angle differently there, so the
/// decomposition is done here.
pub fn euler_from_matrix(matrix: &DMat4, order: EulerOrder) -> DVec3 {
    let (i, j, k) = order.axes();
    let m = rows_of(&DMat3::from_mat4(*matrix));

    let (mut ax, mut ay, mut az);
    if order.repetition {
        let sy = m[i][j].hypot(m[i][k]);
        if sy > GIMBAL_EPSILON {
            ax = m[i][j].atan2(m[i][k]);
            ay = sy.atan2(m[i][i]);
            az = m[j][i].atan2(-m[k][i]);
        } else {
            ax = (-m[j][k]).atan2(m[j][j]);
            ay = sy.atan2(m[i][i]);
            az = 0.0;
        }
    } else {
        let cy = m[i][i].hypot(m[j][i]);
        if cy > GIMBAL_EPSILON {
            ax = m[k][j].atan2(m[k][k]);
            ay = (-m[k][i]).atan2(cy);
            az = m[j][i].atan2(m[i][i]);
        } else {
            ax = (-m[j][k]).atan2(m[j][j]);
            ay = (-m[k][i]).atan2(cy);
            az = 0.0;
        }
    }

    if order.parity {
        (ax, ay, az) = (-ax, -ay, -az);
    }
    if order.rotating {
        std::mem::swap(&mut ax, &mut az);
    }
    DVec3::new(ax, ay, az)
}

/// Transform-related errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Unknown Euler axis order: {0}")]
    UnknownAxisOrder(String),
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_axis_order_names_round_trip() {
        for name in EulerOrder::ALL {
            let order: EulerOrder = name.parse().unwrap();
            assert_eq!(order.to_string(), name);
        }
        assert_eq!(EulerOrder::default().to_string(), "sxyz");
    }

    #[test]
    fn test_unknown_axis_order() {
        for name in ["", "xyz", "qxyz", "sxxz", "sxy", "sxyzx", "swyz"] {
            assert_eq!(
                name.parse::<EulerOrder>(),
                Err(TransformError::UnknownAxisOrder(name.to_string()))
            );
        }
    }

    #[test]
    fn test_rotation_about_x_is_extrinsic_first() {
        let rotation = euler_matrix(DVec3::new(FRAC_PI_2, 0.0, 0.0), EulerOrder::SXYZ);
        let rotated = rotation * DVec3::Y;
        assert!(rotated.abs_diff_eq(DVec3::Z, 1e-12));
    }

    #[test]
    fn test_sxyz_matches_fixed_axis_product() {
        let angles = DVec3::new(0.3, -0.4, 1.2);
        let expected = DMat3::from_rotation_z(angles.z)
            * DMat3::from_rotation_y(angles.y)
            * DMat3::from_rotation_x(angles.x);
        let rotation = euler_matrix(angles, EulerOrder::SXYZ);
        assert!(rotation.abs_diff_eq(expected, 1e-12));

        let rxyz: EulerOrder = "rxyz".parse().unwrap();
        let intrinsic = DMat3::from_rotation_x(angles.x)
            * DMat3::from_rotation_y(angles.y)
            * DMat3::from_rotation_z(angles.z);
        assert!(euler_matrix(angles, rxyz).abs_diff_eq(intrinsic, 1e-12));
    }

    fn elemental(axis: char, angle: f64) -> DMat3 {
        match axis {
            'x' => DMat3::from_rotation_x(angle),
            'y' => DMat3::from_rotation_y(angle),
            _ => DMat3::from_rotation_z(angle),
        }
    }

    #[test]
    fn test_every_order_matches_elemental_product() {
        let angles = [0.3, -0.8, 1.3];
        for name in EulerOrder::ALL {
            let order: EulerOrder = name.parse().unwrap();
            let factors: Vec<DMat3> = name[1..]
                .chars()
                .zip(angles)
                .map(|(axis, angle)| elemental(axis, angle))
                .collect();
            // Static frames apply the first rotation innermost
            let expected = if order.is_rotating() {
                factors[0] * factors[1] * factors[2]
            } else {
                factors[2] * factors[1] * factors[0]
            };
            let rotation = euler_matrix(DVec3::from_array(angles), order);
            assert!(rotation.abs_diff_eq(expected, 1e-12), "order {name}");
        }
    }

    #[test]
    fn test_euler_round_trip_sxyz() {
        let angles = DVec3::new(0.3, -0.7, 1.1);
        let matrix = transform(DVec3::ZERO, angles, EulerOrder::SXYZ);
        let extracted = euler_from_matrix(&matrix, EulerOrder::SXYZ);
        assert!(extracted.abs_diff_eq(angles, 1e-12));
    }

    #[test]
    fn test_euler_round_trip_all_orders() {
        let angles = DVec3::new(0.3, 0.7, 1.1);
        for name in EulerOrder::ALL {
            let order: EulerOrder = name.parse().unwrap();
            let matrix = transform(DVec3::ZERO, angles, order);
            let extracted = euler_from_matrix(&matrix, order);
            let rebuilt = transform(DVec3::ZERO, extracted, order);
            assert!(rebuilt.abs_diff_eq(matrix, 1e-12), "order {name}");
        }
    }

    #[test]
    fn test_gimbal_lock_fixes_third_angle() {
        let angles = DVec3::new(0.4, FRAC_PI_2, 0.9);
        let matrix = transform(DVec3::ZERO, angles, EulerOrder::SXYZ);
        let extracted = euler_from_matrix(&matrix, EulerOrder::SXYZ);

        assert_eq!(extracted.z, 0.0);
        assert!((extracted.y - FRAC_PI_2).abs() < 1e-7);
        let rebuilt = transform(DVec3::ZERO, extracted, EulerOrder::SXYZ);
        assert!(rebuilt.abs_diff_eq(matrix, 1e-7));
    }

    #[test]
    fn test_transform_places_translation_in_last_column() {
        let translation = DVec3::new(1.0, 2.0, 3.0);
        let matrix = transform(translation, DVec3::new(0.1, 0.2, 0.3), EulerOrder::SXYZ);
        assert_eq!(translation_of(&matrix), translation);
        // Rotation applies before translation
        let origin = matrix.transform_point3(DVec3::ZERO);
        assert!(origin.abs_diff_eq(translation, 1e-12));
    }

    #[test]
    fn test_compose_with_identity() {
        let local = transform(DVec3::new(1.0, 1.0, 1.0), DVec3::ONE, EulerOrder::SXYZ);
        assert_eq!(compose(&DMat4::IDENTITY, &local), local);
        assert_eq!(compose(&local, &DMat4::IDENTITY), local);
    }

    #[test]
    fn test_pose_degrees_boundary() {
        let degrees = Pose::new(DVec3::ZERO, DVec3::new(90.0, 0.0, 0.0));
        let radians = Pose::new(DVec3::ZERO, DVec3::new(FRAC_PI_2, 0.0, 0.0));
        let a = degrees.to_mat4(EulerOrder::SXYZ, AngleUnit::Degrees);
        let b = radians.to_mat4(EulerOrder::SXYZ, AngleUnit::Radians);
        assert!(a.abs_diff_eq(b, 1e-12));

        let back = Pose::from_mat4(&a, EulerOrder::SXYZ, AngleUnit::Degrees);
        assert!((back.rotation.x - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_euler_order_serde_as_string() {
        let order: EulerOrder = "rzyx".parse().unwrap();
        let text = ron::to_string(&order).unwrap();
        assert_eq!(text, "\"rzyx\"");
        let back: EulerOrder = ron::from_str(&text).unwrap();
        assert_eq!(back, order);
    }
}
