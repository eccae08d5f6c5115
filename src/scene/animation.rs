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

//! Animation data: keyframe curves in FBX tick space, curve nodes binding
//! up to three channels to a property, layers, stacks and take infos.

use crate::{
    document::{FbxNode, FbxNodeContainer},
    error::FbxError,
    pool::{Handle, Pool},
    scene::{
        properties::FbxPropertyValue, FbxComponent, FbxObject, FbxTime,
    },
};
use nalgebra::Vector3;
use std::cell::Cell;

pub struct FbxAnimationCurve {
    pub base: FbxObject,
    pub times: Vec<i64>,
    pub values: Vec<f32>,
    pub flags: Vec<i32>,
    last_eval: Cell<Option<(i64, f64)>>,
}

impl FbxAnimationCurve {
    pub(crate) fn read(
        base: FbxObject,
        curve_handle: Handle<FbxNode>,
        nodes: &FbxNodeContainer,
    ) -> Result<Self, FbxError> {
        let mut times = Vec::new();
        if let Ok(key_time_handle) = nodes.find(curve_handle, "KeyTime") {
            let key_time_array = nodes.get_by_name(key_time_handle, "a")?;
            times.reserve(key_time_array.attrib_count());
            for attrib in key_time_array.attributes() {
                times.push(attrib.as_i64()?);
            }
        }

        let mut values = Vec::new();
        if let Ok(key_value_handle) = nodes.find(curve_handle, "KeyValueFloat") {
            let key_value_array = nodes.get_by_name(key_value_handle, "a")?;
            values.reserve(key_value_array.attrib_count());
            for attrib in key_value_array.attributes() {
                values.push(attrib.as_f32()?);
            }
        }

        if times.len() != values.len() {
            return Err(String::from("FBX: Animation curve contains wrong key data!").into());
        }

        // A single flag entry is broadcast over every key.
        let mut flags = Vec::new();
        if let Ok(flags_handle) = nodes.find(curve_handle, "KeyAttrFlags") {
            let flags_array = nodes.get_by_name(flags_handle, "a")?;
            for attrib in flags_array.attributes() {
                flags.push(attrib.as_i32()?);
            }
            if flags.len() == 1 {
                flags = vec![flags[0]; values.len()];
            } else if flags.len() != values.len() {
                return Err(String::from("FBX: Animation curve contains wrong key data!").into());
            }
        }

        Ok(FbxAnimationCurve {
            base,
            times,
            values,
            flags,
            last_eval: Cell::new(None),
        })
    }

    /// Piecewise-linear sample at `time`, clamped to the key range. The last
    /// evaluation is memoized so repeated queries at one time are free.
    pub fn evaluate(&self, time: FbxTime) -> f64 {
        let ticks = time.ticks();
        if let Some((cached_time, cached_value)) = self.last_eval.get() {
            if cached_time == ticks {
                return cached_value;
            }
        }

        let result = self.evaluate_uncached(ticks);
        self.last_eval.set(Some((ticks, result)));
        result
    }

    fn evaluate_uncached(&self, time: i64) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }

        let time = time
            .max(self.times[0])
            .min(self.times[self.times.len() - 1]);

        for i in 1..self.times.len() {
            if self.times[i] >= time {
                let span = (self.times[i] - self.times[i - 1]) as f64;
                let t = (time - self.times[i - 1]) as f64 / span;
                return f64::from(self.values[i - 1]) * (1.0 - t) + f64::from(self.values[i]) * t;
            }
        }

        // Single-key curve; the clamp above pinned time to that key.
        f64::from(self.values[0])
    }

    pub fn key_count(&self) -> usize {
        self.times.len()
    }

    pub fn key_time(&self, index: usize) -> i64 {
        self.times[index]
    }

    pub fn key_value(&self, index: usize) -> f32 {
        self.values[index]
    }

    pub fn key_flag(&self, index: usize) -> i32 {
        self.flags.get(index).copied().unwrap_or(0)
    }
}

/// What a curve node animates on its owner, derived from the connection's
/// property name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxAnimationCurveNodeType {
    Translation,
    Rotation,
    Scaling,
    Visibility,
    FieldOfView,
    Custom,
}

pub const ANIMATION_PROPERTY_TRANSLATION: &str = "Lcl Translation";
pub const ANIMATION_PROPERTY_ROTATION: &str = "Lcl Rotation";
pub const ANIMATION_PROPERTY_SCALING: &str = "Lcl Scaling";
pub const ANIMATION_PROPERTY_VISIBILITY: &str = "Visibility";
pub const ANIMATION_PROPERTY_FIELD_OF_VIEW: &str = "Field Of View";

impl FbxAnimationCurveNodeType {
    pub fn from_property_name(name: &str) -> Self {
        match name {
            ANIMATION_PROPERTY_TRANSLATION => Self::Translation,
            ANIMATION_PROPERTY_ROTATION => Self::Rotation,
            ANIMATION_PROPERTY_SCALING => Self::Scaling,
            ANIMATION_PROPERTY_VISIBILITY => Self::Visibility,
            ANIMATION_PROPERTY_FIELD_OF_VIEW => Self::FieldOfView,
            _ => Self::Custom,
        }
    }
}

pub struct FbxAnimationCurveNode {
    pub base: FbxObject,
    pub actual_type: FbxAnimationCurveNodeType,
    /// Object whose property this node animates.
    pub owner: Handle<FbxComponent>,
    /// Name of the animated property slot on the owner.
    pub owner_property: String,
    /// Layer this node lives on.
    pub layer: Handle<FbxComponent>,
    /// Up to three channels (x, y, z) in attachment order.
    curves: Vec<Handle<FbxComponent>>,
}

impl FbxAnimationCurveNode {
    pub fn new(base: FbxObject) -> Self {
        FbxAnimationCurveNode {
            base,
            actual_type: FbxAnimationCurveNodeType::Custom,
            owner: Handle::NONE,
            owner_property: String::new(),
            layer: Handle::NONE,
            curves: Vec::new(),
        }
    }

    pub fn curves(&self) -> &[Handle<FbxComponent>] {
        &self.curves
    }

    pub fn attach_curve(&mut self, curve: Handle<FbxComponent>) -> bool {
        if self.curves.len() < 3 {
            self.curves.push(curve);
            true
        } else {
            false
        }
    }

    /// Samples all channels, returning zero for the missing ones.
    pub fn eval_vec3(&self, components: &Pool<FbxComponent>, time: FbxTime) -> Vector3<f64> {
        let coord = |i: usize| match self
            .curves
            .get(i)
            .and_then(|handle| components.try_borrow(*handle))
        {
            Some(FbxComponent::AnimationCurve(curve)) => curve.evaluate(time),
            _ => 0.0,
        };
        Vector3::new(coord(0), coord(1), coord(2))
    }

    /// Sample of the first channel, for scalar properties.
    pub fn eval_value(&self, components: &Pool<FbxComponent>, time: FbxTime) -> f64 {
        match self
            .curves
            .first()
            .and_then(|handle| components.try_borrow(*handle))
        {
            Some(FbxComponent::AnimationCurve(curve)) => curve.evaluate(time),
            _ => 0.0,
        }
    }
}

pub struct FbxAnimationLayer {
    pub base: FbxObject,
    pub curve_nodes: Vec<Handle<FbxComponent>>,
    pub sublayers: Vec<Handle<FbxComponent>>,
    pub parent_layer: Handle<FbxComponent>,
}

impl FbxAnimationLayer {
    pub fn new(mut base: FbxObject) -> Self {
        base.properties.declare("LayerID", FbxPropertyValue::Int(0));
        base.properties.declare("Mute", FbxPropertyValue::Bool(false));
        base.properties.declare("Solo", FbxPropertyValue::Bool(false));
        base.properties.declare("Lock", FbxPropertyValue::Bool(false));
        base.properties
            .declare("Weight", FbxPropertyValue::Double(100.0));
        base.properties.declare("LayerMode", FbxPropertyValue::Enum(0));
        base.properties
            .declare("LayerRotationMode", FbxPropertyValue::Enum(0));

        FbxAnimationLayer {
            base,
            curve_nodes: Vec::new(),
            sublayers: Vec::new(),
            parent_layer: Handle::NONE,
        }
    }

    pub fn layer_id(&self) -> i32 {
        self.base.properties.int_of("LayerID")
    }

    pub fn weight(&self) -> f64 {
        self.base.properties.double_of("Weight")
    }

    pub fn blend_mode(&self) -> i32 {
        self.base.properties.int_of("LayerMode")
    }

    pub fn rotation_mode(&self) -> i32 {
        self.base.properties.int_of("LayerRotationMode")
    }
}

pub struct FbxAnimationStack {
    pub base: FbxObject,
    /// Loop range in FBX ticks.
    pub loop_start: i64,
    pub loop_stop: i64,
    /// Layers ordered by their user-assigned `LayerID`.
    pub layers: Vec<Handle<FbxComponent>>,
}

impl FbxAnimationStack {
    pub(crate) fn read(
        base: FbxObject,
        stack_handle: Handle<FbxNode>,
        nodes: &FbxNodeContainer,
    ) -> Result<Self, FbxError> {
        let mut loop_start = 0;
        let mut loop_stop = FbxTime::from_seconds(4.0).ticks();

        if let Ok(properties) = nodes.get_by_name(stack_handle, "Properties70") {
            for prop_handle in properties.children() {
                let prop = nodes.get(*prop_handle);
                let Ok(name) = prop.get_attrib(0) else {
                    continue;
                };
                match name.as_string().as_str() {
                    "LocalStart" => loop_start = prop.get_attrib(4)?.as_i64()?,
                    "LocalStop" => loop_stop = prop.get_attrib(4)?.as_i64()?,
                    _ => (),
                }
            }
        }

        Ok(FbxAnimationStack {
            base,
            loop_start,
            loop_stop,
            layers: Vec::new(),
        })
    }
}

/// Description of a take from the document's `Takes` block.
pub struct FbxTakeInfo {
    pub name: String,
    pub filename: String,
    pub local_time_from: f64,
    pub local_time_to: f64,
    pub reference_time_from: f64,
    pub reference_time_to: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    fn curve(times: Vec<i64>, values: Vec<f32>) -> FbxAnimationCurve {
        FbxAnimationCurve {
            base: FbxObject::unattached("curve"),
            times,
            values,
            flags: Vec::new(),
            last_eval: Cell::new(None),
        }
    }

    const SECOND: i64 = 46_186_158_000;

    #[test]
    fn empty_curve_evaluates_to_zero() {
        let curve = curve(Vec::new(), Vec::new());
        assert_eq!(curve.evaluate(FbxTime::new(0)), 0.0);
    }

    #[test]
    fn interpolation_and_clamping() {
        let curve = curve(vec![0, SECOND], vec![0.0, 10.0]);

        let mid = curve.evaluate(FbxTime::new(SECOND / 2));
        assert!((mid - 5.0).abs() < 1e-9);

        // Clamped on both sides.
        assert_eq!(curve.evaluate(FbxTime::new(-1)), 0.0);
        assert_eq!(curve.evaluate(FbxTime::new(1_000_000_000_000)), 10.0);

        // Exact at keyframes.
        assert_eq!(curve.evaluate(FbxTime::new(0)), 0.0);
        assert_eq!(curve.evaluate(FbxTime::new(SECOND)), 10.0);
    }

    #[test]
    fn memoization_stores_time_and_value() {
        let curve = curve(vec![0, SECOND], vec![0.0, 10.0]);
        let t = FbxTime::new(SECOND / 4);
        let first = curve.evaluate(t);
        assert_eq!(curve.last_eval.get(), Some((t.ticks(), first)));
        // The cached slot must hold the result, not a stale default.
        assert_eq!(curve.evaluate(t), first);
        let other = curve.evaluate(FbxTime::new(0));
        assert_eq!(other, 0.0);
        assert_eq!(curve.last_eval.get(), Some((0, 0.0)));
    }

    #[test]
    fn single_key_curve() {
        let curve = curve(vec![SECOND], vec![3.0]);
        assert_eq!(curve.evaluate(FbxTime::new(0)), 3.0);
        assert_eq!(curve.evaluate(FbxTime::new(2 * SECOND)), 3.0);
    }

    #[test]
    fn curve_node_type_from_property() {
        assert_eq!(
            FbxAnimationCurveNodeType::from_property_name("Lcl Rotation"),
            FbxAnimationCurveNodeType::Rotation
        );
        assert_eq!(
            FbxAnimationCurveNodeType::from_property_name("d|X"),
            FbxAnimationCurveNodeType::Custom
        );
    }

    #[test]
    fn curve_node_accepts_three_channels() {
        let mut node = FbxAnimationCurveNode::new(FbxObject::unattached("T"));
        assert!(node.attach_curve(Handle::NONE));
        assert!(node.attach_curve(Handle::NONE));
        assert!(node.attach_curve(Handle::NONE));
        assert!(!node.attach_curve(Handle::NONE));
    }
}
