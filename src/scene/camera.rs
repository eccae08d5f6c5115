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

//! Camera parameters and the matrices composed from them. All film and
//! aperture values are declared as property slots on the Camera kind model
//! and overwritten from the document during retrieve, so they can come from
//! either the model itself or its node attribute.

use crate::{
    pool::Handle,
    scene::{
        model::FbxModel,
        properties::{FbxPropertySet, FbxPropertyValue},
        FbxComponent, FbxModelKind,
    },
};
use nalgebra::{Matrix4, Vector3};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxApertureMode {
    Vertical = 0,
    Horizontal = 1,
    VerticalHorizontal = 2,
    FocalLength = 3,
}

impl FbxApertureMode {
    fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Horizontal,
            2 => Self::VerticalHorizontal,
            3 => Self::FocalLength,
            _ => Self::Vertical,
        }
    }
}

pub(crate) fn declare_camera_properties(properties: &mut FbxPropertySet) {
    properties.declare(
        "Color",
        FbxPropertyValue::Color(Vector3::new(0.8, 0.8, 0.8)),
    );
    properties.declare("Position", FbxPropertyValue::Vector3(Vector3::zeros()));
    properties.declare(
        "UpVector",
        FbxPropertyValue::Vector3(Vector3::new(0.0, 1.0, 0.0)),
    );
    properties.declare(
        "InterestPosition",
        FbxPropertyValue::Vector3(Vector3::zeros()),
    );
    properties.declare("OpticalCenterX", FbxPropertyValue::Double(0.0));
    properties.declare("OpticalCenterY", FbxPropertyValue::Double(0.0));
    properties.declare(
        "BackgroundColor",
        FbxPropertyValue::Color(Vector3::new(0.63, 0.63, 0.63)),
    );
    properties.declare("UseFrameColor", FbxPropertyValue::Bool(false));
    properties.declare(
        "FrameColor",
        FbxPropertyValue::Color(Vector3::new(0.3, 0.3, 0.3)),
    );
    properties.declare("TurnTable", FbxPropertyValue::Double(0.0));
    properties.declare("AspectRatioMode", FbxPropertyValue::Enum(0));
    properties.declare("AspectWidth", FbxPropertyValue::Double(320.0));
    properties.declare("AspectHeight", FbxPropertyValue::Double(200.0));
    properties.declare("PixelAspectRatio", FbxPropertyValue::Double(1.0));
    properties.declare(
        "ApertureMode",
        FbxPropertyValue::Enum(FbxApertureMode::Vertical as i32),
    );
    properties.declare("FilmOffsetX", FbxPropertyValue::Double(0.0));
    properties.declare("FilmOffsetY", FbxPropertyValue::Double(0.0));
    properties.declare("FilmWidth", FbxPropertyValue::Double(0.816));
    properties.declare("FilmHeight", FbxPropertyValue::Double(0.612));
    properties.declare("FilmAspectRatio", FbxPropertyValue::Double(1.3333333));
    properties.declare("FilmSqueezeRatio", FbxPropertyValue::Double(1.0));
    properties.declare("WindowWidth", FbxPropertyValue::Double(640.0));
    properties.declare("WindowHeight", FbxPropertyValue::Double(680.0));
    properties.declare_animatable("FieldOfView", FbxPropertyValue::Double(25.114999));
    properties.declare("FieldOfViewX", FbxPropertyValue::Double(40.0));
    properties.declare("FieldOfViewY", FbxPropertyValue::Double(40.0));
    properties.declare("FocalLength", FbxPropertyValue::Double(34.89327));
    properties.declare("NearPlane", FbxPropertyValue::Double(10.0));
    properties.declare("FarPlane", FbxPropertyValue::Double(4000.0));
    properties.declare("LookAtProperty", FbxPropertyValue::Object(Handle::NONE));
    properties.declare_animatable("Roll", FbxPropertyValue::Double(0.0));
}

/// Typed reader over the camera parameter slots of a Camera kind model.
pub struct FbxCamera<'a> {
    model: &'a FbxModel,
}

impl<'a> FbxCamera<'a> {
    pub fn from_model(model: &'a FbxModel) -> Option<Self> {
        if model.kind == FbxModelKind::Camera {
            Some(Self { model })
        } else {
            None
        }
    }

    fn props(&self) -> &FbxPropertySet {
        &self.model.base.properties
    }

    pub fn position(&self) -> Vector3<f64> {
        self.props().vec3_of("Position")
    }

    pub fn interest_position(&self) -> Vector3<f64> {
        self.props().vec3_of("InterestPosition")
    }

    pub fn up_vector(&self) -> Vector3<f64> {
        self.props().vec3_of("UpVector")
    }

    /// Vertical field of view in degrees.
    pub fn field_of_view(&self) -> f64 {
        self.props().double_of("FieldOfView")
    }

    pub fn focal_length(&self) -> f64 {
        self.props().double_of("FocalLength")
    }

    pub fn near_plane(&self) -> f64 {
        self.props().double_of("NearPlane")
    }

    pub fn far_plane(&self) -> f64 {
        self.props().double_of("FarPlane")
    }

    pub fn film_width(&self) -> f64 {
        self.props().double_of("FilmWidth")
    }

    pub fn film_height(&self) -> f64 {
        self.props().double_of("FilmHeight")
    }

    pub fn aspect_width(&self) -> f64 {
        self.props().double_of("AspectWidth")
    }

    pub fn aspect_height(&self) -> f64 {
        self.props().double_of("AspectHeight")
    }

    pub fn aperture_mode(&self) -> FbxApertureMode {
        FbxApertureMode::from_i32(self.props().int_of("ApertureMode"))
    }

    pub fn roll(&self) -> f64 {
        self.props().double_of("Roll")
    }

    /// Target object bound through the `LookAtProperty` connection, if any.
    pub fn target(&self) -> Handle<FbxComponent> {
        self.props().object_of("LookAtProperty")
    }

    /// Field of view derived from a focal length and an aperture dimension.
    pub fn compute_field_of_view(&self, focal: f64, aperture: f64) -> f64 {
        2.0 * (aperture / 2.0 * focal).atan()
    }

    /// Right-handed perspective projection from the camera's planes and
    /// vertical field of view.
    pub fn projection_matrix(&self, aspect: f64) -> Matrix4<f64> {
        Matrix4::new_perspective(
            aspect,
            self.field_of_view().to_radians(),
            self.near_plane(),
            self.far_plane(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::FbxObject;

    fn camera_model() -> FbxModel {
        FbxModel::new(FbxObject::unattached("cam"), FbxModelKind::Camera)
    }

    #[test]
    fn film_defaults() {
        let model = camera_model();
        let camera = FbxCamera::from_model(&model).unwrap();
        assert_eq!(camera.film_width(), 0.816);
        assert_eq!(camera.film_height(), 0.612);
        assert_eq!(camera.near_plane(), 10.0);
        assert_eq!(camera.far_plane(), 4000.0);
        assert_eq!(camera.aperture_mode(), FbxApertureMode::Vertical);
        assert!((camera.field_of_view() - 25.114999).abs() < 1e-9);
        assert!(camera.target().is_none());
    }

    #[test]
    fn projection_is_perspective() {
        let model = camera_model();
        let camera = FbxCamera::from_model(&model).unwrap();
        let projection = camera.projection_matrix(16.0 / 9.0);
        // Perspective matrices put -1 in the w row.
        assert_eq!(projection[(3, 2)], -1.0);
        assert_eq!(projection[(3, 3)], 0.0);
    }
}
