// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Scene nodes. A model's placement follows the FBX multi-pivot transform
//! stack; when every pivot, offset and pre/post rotation is zero the
//! composition collapses to plain `T * R * S`, which keeps the common case
//! cheap and numerically clean.

use crate::{
    pool::Handle,
    scene::{
        camera::declare_camera_properties,
        light::declare_light_properties,
        properties::{FbxPropertySet, FbxPropertyValue},
        FbxComponent, FbxObject,
    },
};
use nalgebra::{Matrix4, Rotation3, Vector3};
use std::cell::Cell;

/// Class discriminant of a `Model` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxModelKind {
    Root,
    Mesh,
    LimbNode,
    Null,
    Camera,
    Light,
}

/// Euler application order for `Lcl Rotation`. `SphericXyz` evaluates as
/// `EulerXyz`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxRotationOrder {
    EulerXyz,
    EulerXzy,
    EulerYzx,
    EulerYxz,
    EulerZxy,
    EulerZyx,
    SphericXyz,
}

impl FbxRotationOrder {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::EulerXzy,
            2 => Self::EulerYzx,
            3 => Self::EulerYxz,
            4 => Self::EulerZxy,
            5 => Self::EulerZyx,
            6 => Self::SphericXyz,
            _ => Self::EulerXyz,
        }
    }
}

/// Composes the three axis rotations (angles in degrees) in the given
/// order; "XYZ" means X is applied first, so the product is `Rz * Ry * Rx`.
pub fn rotation_matrix(euler: Vector3<f64>, order: FbxRotationOrder) -> Matrix4<f64> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), euler.x.to_radians()).to_homogeneous();
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), euler.y.to_radians()).to_homogeneous();
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), euler.z.to_radians()).to_homogeneous();

    match order {
        FbxRotationOrder::EulerXyz | FbxRotationOrder::SphericXyz => rz * ry * rx,
        FbxRotationOrder::EulerXzy => ry * rz * rx,
        FbxRotationOrder::EulerYzx => rx * rz * ry,
        FbxRotationOrder::EulerYxz => rz * rx * ry,
        FbxRotationOrder::EulerZxy => ry * rx * rz,
        FbxRotationOrder::EulerZyx => rx * ry * rz,
    }
}

fn translation_matrix(v: Vector3<f64>) -> Matrix4<f64> {
    Matrix4::new_translation(&v)
}

fn is_zero(v: Vector3<f64>) -> bool {
    v == Vector3::zeros()
}

/// One-slot evaluation caches keyed by time. The local and global matrices
/// carry separate stamps since either query can run on its own. Reached
/// through shared references during evaluation, hence the cells; the scene
/// is not `Sync`.
pub(crate) struct FbxTransformCache {
    pub(crate) local_time: Cell<i64>,
    pub(crate) local: Cell<Matrix4<f64>>,
    pub(crate) global_time: Cell<i64>,
    pub(crate) global: Cell<Matrix4<f64>>,
}

impl Default for FbxTransformCache {
    fn default() -> Self {
        Self {
            local_time: Cell::new(i64::MIN),
            local: Cell::new(Matrix4::identity()),
            global_time: Cell::new(i64::MIN),
            global: Cell::new(Matrix4::identity()),
        }
    }
}

pub struct FbxModel {
    pub base: FbxObject,
    pub kind: FbxModelKind,
    /// Geometry of a Mesh kind model; at most one.
    pub geometry: Handle<FbxComponent>,
    pub materials: Vec<Handle<FbxComponent>>,
    pub parent: Handle<FbxComponent>,
    pub children: Vec<Handle<FbxComponent>>,
    /// Every curve node targeting this model, regardless of layer.
    pub animation_nodes: Vec<Handle<FbxComponent>>,
    pub(crate) cache: FbxTransformCache,
}

impl FbxModel {
    pub fn new(mut base: FbxObject, kind: FbxModelKind) -> Self {
        declare_model_properties(&mut base.properties);
        match kind {
            FbxModelKind::LimbNode => {
                base.properties
                    .declare("Size", FbxPropertyValue::Double(10.0));
                base.properties.declare(
                    "Color",
                    FbxPropertyValue::Color(Vector3::new(0.85, 0.85, 0.20)),
                );
            }
            FbxModelKind::Null => {
                base.properties
                    .declare("Size", FbxPropertyValue::Double(100.0));
            }
            FbxModelKind::Camera => declare_camera_properties(&mut base.properties),
            FbxModelKind::Light => declare_light_properties(&mut base.properties),
            FbxModelKind::Root | FbxModelKind::Mesh => (),
        }

        FbxModel {
            base,
            kind,
            geometry: Handle::NONE,
            materials: Vec::new(),
            parent: Handle::NONE,
            children: Vec::new(),
            animation_nodes: Vec::new(),
            cache: Default::default(),
        }
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.base.properties.vec3_of("Lcl Translation")
    }

    pub fn rotation(&self) -> Vector3<f64> {
        self.base.properties.vec3_of("Lcl Rotation")
    }

    pub fn scaling(&self) -> Vector3<f64> {
        self.base.properties.vec3_of("Lcl Scaling")
    }

    pub fn rotation_order(&self) -> FbxRotationOrder {
        FbxRotationOrder::from_i32(self.base.properties.int_of("RotationOrder"))
    }

    /// Local transform for explicit T/R/S values, honoring pivots, offsets
    /// and pre/post rotations:
    ///
    /// `T * Roff * Rp * Rpre * R * Rpost^-1 * Rp^-1 * Soff * Sp * S * Sp^-1`
    pub fn eval_local(
        &self,
        translation: Vector3<f64>,
        rotation: Vector3<f64>,
        scaling: Vector3<f64>,
    ) -> Matrix4<f64> {
        let props = &self.base.properties;
        let rotation_pivot = props.vec3_of("RotationPivot");
        let scaling_pivot = props.vec3_of("ScalingPivot");
        let rotation_offset = props.vec3_of("RotationOffset");
        let scaling_offset = props.vec3_of("ScalingOffset");

        // Pre/post rotation and a custom order apply only while rotation
        // DOF is active.
        let rotation_active = props.bool_of("RotationActive");
        let (pre_rotation, post_rotation, rotation_order) = if rotation_active {
            (
                props.vec3_of("PreRotation"),
                props.vec3_of("PostRotation"),
                self.rotation_order(),
            )
        } else {
            (
                Vector3::zeros(),
                Vector3::zeros(),
                FbxRotationOrder::EulerXyz,
            )
        };

        let t = translation_matrix(translation);
        let r = rotation_matrix(rotation, rotation_order);
        let s = Matrix4::new_nonuniform_scaling(&scaling);

        if is_zero(rotation_pivot)
            && is_zero(scaling_pivot)
            && is_zero(pre_rotation)
            && is_zero(post_rotation)
            && is_zero(rotation_offset)
            && is_zero(scaling_offset)
        {
            t * r * s
        } else {
            let r_pre = rotation_matrix(pre_rotation, FbxRotationOrder::EulerXyz);
            let r_post_inv = rotation_matrix(-post_rotation, FbxRotationOrder::EulerZyx);
            let r_off = translation_matrix(rotation_offset);
            let r_p = translation_matrix(rotation_pivot);
            let r_p_inv = translation_matrix(-rotation_pivot);
            let s_off = translation_matrix(scaling_offset);
            let s_p = translation_matrix(scaling_pivot);
            let s_p_inv = translation_matrix(-scaling_pivot);

            // http://help.autodesk.com/view/FBX/2017/ENU/?guid=__files_GUID_10CDD63C_79C1_4F2D_BB28_AD2BE65A02ED_htm
            t * r_off * r_p * r_pre * r * r_post_inv * r_p_inv * s_off * s_p * s * s_p_inv
        }
    }

    /// Pivot transform of the geometry itself, distinct from the node
    /// transform.
    pub fn geometric_matrix(&self) -> Matrix4<f64> {
        let props = &self.base.properties;
        let translation = props.vec3_of("GeometricTranslation");
        let rotation = props.vec3_of("GeometricRotation");
        let scale = props.vec3_of("GeometricScaling");

        let scale_mtx = Matrix4::new_nonuniform_scaling(&scale);
        let mut mtx = rotation_matrix(rotation, FbxRotationOrder::EulerXyz);
        mtx[(0, 3)] = translation.x;
        mtx[(1, 3)] = translation.y;
        mtx[(2, 3)] = translation.z;

        scale_mtx * mtx
    }
}

fn declare_model_properties(properties: &mut FbxPropertySet) {
    properties.declare("RotationOrder", FbxPropertyValue::Enum(0));
    properties.declare("RotationActive", FbxPropertyValue::Bool(false));
    properties.declare("PreRotation", FbxPropertyValue::Vector3(Vector3::zeros()));
    properties.declare("PostRotation", FbxPropertyValue::Vector3(Vector3::zeros()));
    properties.declare("RotationOffset", FbxPropertyValue::Vector3(Vector3::zeros()));
    properties.declare("RotationPivot", FbxPropertyValue::Vector3(Vector3::zeros()));
    properties.declare("ScalingOffset", FbxPropertyValue::Vector3(Vector3::zeros()));
    properties.declare("ScalingPivot", FbxPropertyValue::Vector3(Vector3::zeros()));
    properties.declare_animatable("Visibility", FbxPropertyValue::Bool(true));
    properties.declare("Visibility Inheritance", FbxPropertyValue::Bool(true));
    properties.declare_animatable(
        "Lcl Translation",
        FbxPropertyValue::Vector3(Vector3::zeros()),
    );
    properties.declare_animatable("Lcl Rotation", FbxPropertyValue::Vector3(Vector3::zeros()));
    properties.declare_animatable(
        "Lcl Scaling",
        FbxPropertyValue::Vector3(Vector3::new(1.0, 1.0, 1.0)),
    );
    properties.declare(
        "GeometricTranslation",
        FbxPropertyValue::Vector3(Vector3::zeros()),
    );
    properties.declare(
        "GeometricRotation",
        FbxPropertyValue::Vector3(Vector3::zeros()),
    );
    properties.declare(
        "GeometricScaling",
        FbxPropertyValue::Vector3(Vector3::new(1.0, 1.0, 1.0)),
    );
    properties.declare("QuaternionInterpolation", FbxPropertyValue::Bool(false));
    properties.declare("Show", FbxPropertyValue::Bool(true));
    properties.declare("Pickable", FbxPropertyValue::Bool(true));
    properties.declare("Transformable", FbxPropertyValue::Bool(true));
    properties.declare("Casts Shadows", FbxPropertyValue::Bool(true));
    properties.declare("Receive Shadows", FbxPropertyValue::Bool(true));
    properties.declare("Primary Visibility", FbxPropertyValue::Bool(true));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::FbxDocument;
    use crate::scene::FbxObject;

    fn assert_matrix_eq(a: &Matrix4<f64>, b: &Matrix4<f64>) {
        for i in 0..16 {
            assert!(
                (a[i] - b[i]).abs() < 1e-9,
                "matrices differ at {i}: {a} vs {b}"
            );
        }
    }

    fn model() -> FbxModel {
        FbxModel::new(FbxObject::unattached("test"), FbxModelKind::Null)
    }

    #[test]
    fn cheap_path_is_trs() {
        let model = model();
        let t = Vector3::new(1.0, 2.0, 3.0);
        let r = Vector3::new(30.0, 45.0, 60.0);
        let s = Vector3::new(2.0, 2.0, 2.0);

        let expected = translation_matrix(t)
            * rotation_matrix(r, FbxRotationOrder::EulerXyz)
            * Matrix4::new_nonuniform_scaling(&s);
        assert_matrix_eq(&model.eval_local(t, r, s), &expected);
    }

    #[test]
    fn rotation_pivot_path() {
        let mut model = model();
        let props70 = "Properties70: {\n\
             \tP: \"RotationPivot\", \"Vector3D\", \"\", \"\", 1, 0, 0\n\
             }\n";
        let doc = FbxDocument::from_memory(props70.as_bytes()).unwrap();
        let props = doc.nodes().get_by_name(doc.root(), "Properties70").unwrap();
        model.base.properties.retrieve_from(props, doc.nodes());

        let t = Vector3::new(0.0, 0.0, 0.0);
        let r = Vector3::new(0.0, 0.0, 90.0);
        let s = Vector3::new(1.0, 1.0, 1.0);

        let pivot = Vector3::new(1.0, 0.0, 0.0);
        let expected = translation_matrix(pivot)
            * rotation_matrix(r, FbxRotationOrder::EulerXyz)
            * translation_matrix(-pivot);
        assert_matrix_eq(&model.eval_local(t, r, s), &expected);

        // Rotating (2, 0, 0) by 90 degrees around z about the pivot (1, 0, 0)
        // lands on (1, 1, 0).
        let p = model.eval_local(t, r, s).transform_point(&nalgebra::Point3::new(2.0, 0.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pre_rotation_requires_rotation_active() {
        let mut model = model();
        let props70 = "Properties70: {\n\
             \tP: \"PreRotation\", \"Vector3D\", \"\", \"\", 0, 0, 90\n\
             }\n";
        let doc = FbxDocument::from_memory(props70.as_bytes()).unwrap();
        let props = doc.nodes().get_by_name(doc.root(), "Properties70").unwrap();
        model.base.properties.retrieve_from(props, doc.nodes());

        // RotationActive is false, so the pre-rotation is ignored and the
        // cheap path applies.
        let local = model.eval_local(Vector3::zeros(), Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        assert_matrix_eq(&local, &Matrix4::identity());
    }

    #[test]
    fn post_rotation_inverse_cancels_itself() {
        let v = Vector3::new(10.0, 20.0, 30.0);
        let forward = rotation_matrix(v, FbxRotationOrder::EulerXyz);
        let inverse = rotation_matrix(-v, FbxRotationOrder::EulerZyx);
        assert_matrix_eq(&(inverse * forward), &Matrix4::identity());
    }

    #[test]
    fn rotation_orders_differ() {
        let euler = Vector3::new(90.0, 90.0, 0.0);
        let xyz = rotation_matrix(euler, FbxRotationOrder::EulerXyz);
        let zyx = rotation_matrix(euler, FbxRotationOrder::EulerZyx);
        assert!((0..16).any(|i| (xyz[i] - zyx[i]).abs() > 1e-6));

        let spheric = rotation_matrix(euler, FbxRotationOrder::SphericXyz);
        assert_matrix_eq(&spheric, &xyz);
    }

    #[test]
    fn limb_and_null_defaults() {
        let limb = FbxModel::new(FbxObject::unattached("bone"), FbxModelKind::LimbNode);
        assert_eq!(limb.base.properties.double_of("Size"), 10.0);
        let null = FbxModel::new(FbxObject::unattached("locator"), FbxModelKind::Null);
        assert_eq!(null.base.properties.double_of("Size"), 100.0);
        assert_eq!(null.scaling(), Vector3::new(1.0, 1.0, 1.0));
    }
}
