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

use crate::scene::{
    model::FbxModel,
    properties::{FbxPropertySet, FbxPropertyValue},
    FbxModelKind,
};
use nalgebra::Vector3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxLightType {
    Point = 0,
    Directional = 1,
    Spot = 2,
    Area = 3,
    Volume = 4,
}

impl FbxLightType {
    fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Point,
            1 => Self::Directional,
            2 => Self::Spot,
            3 => Self::Area,
            4 => Self::Volume,
            _ => {
                log::warn!("unknown light type {value}, fallback to Point");
                Self::Point
            }
        }
    }
}

pub(crate) fn declare_light_properties(properties: &mut FbxPropertySet) {
    properties.declare("LightType", FbxPropertyValue::Enum(FbxLightType::Point as i32));
    properties.declare("AttenuationType", FbxPropertyValue::Enum(1));
    properties.declare_animatable("Intensity", FbxPropertyValue::Double(100.0));
    properties.declare_animatable("InnerAngle", FbxPropertyValue::Double(45.0));
    properties.declare_animatable("OuterAngle", FbxPropertyValue::Double(50.0));
    properties.declare_animatable(
        "DiffuseColor",
        FbxPropertyValue::Color(Vector3::new(1.0, 1.0, 1.0)),
    );
    properties.declare("CastShadows", FbxPropertyValue::Bool(true));
    properties.declare("CastLightOnObject", FbxPropertyValue::Bool(true));
}

/// Typed reader over the light parameter slots of a Light kind model.
pub struct FbxLight<'a> {
    model: &'a FbxModel,
}

impl<'a> FbxLight<'a> {
    pub fn from_model(model: &'a FbxModel) -> Option<Self> {
        if model.kind == FbxModelKind::Light {
            Some(Self { model })
        } else {
            None
        }
    }

    pub fn light_type(&self) -> FbxLightType {
        FbxLightType::from_i32(self.model.base.properties.int_of("LightType"))
    }

    pub fn intensity(&self) -> f64 {
        self.model.base.properties.double_of("Intensity")
    }

    /// Hotspot cone angle in degrees.
    pub fn inner_angle(&self) -> f64 {
        self.model.base.properties.double_of("InnerAngle")
    }

    /// Falloff cone angle in degrees.
    pub fn outer_angle(&self) -> f64 {
        self.model.base.properties.double_of("OuterAngle")
    }

    pub fn color(&self) -> Vector3<f64> {
        self.model.base.properties.vec3_of("DiffuseColor")
    }

    pub fn cast_shadows(&self) -> bool {
        self.model.base.properties.bool_of("CastShadows")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::{FbxModelKind, FbxObject};

    #[test]
    fn defaults() {
        let model = FbxModel::new(FbxObject::unattached("lamp"), FbxModelKind::Light);
        let light = FbxLight::from_model(&model).unwrap();
        assert_eq!(light.light_type(), FbxLightType::Point);
        assert_eq!(light.intensity(), 100.0);
        assert_eq!(light.inner_angle(), 45.0);
        assert_eq!(light.outer_angle(), 50.0);
        assert_eq!(light.color(), Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn only_light_models_qualify(){
        let model = FbxModel::new(FbxObject::unattached("not a lamp"), FbxModelKind::Null);
        assert!(FbxLight::from_model(&model).is_none());
    }

    #[test]
    fn unknown_type_falls_back_to_point() {
        assert_eq!(FbxLightType::from_i32(99), FbxLightType::Point);
        assert_eq!(FbxLightType::from_i32(2), FbxLightType::Spot);
    }
}
