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

use crate::{
    pool::Handle,
    scene::{
        properties::{FbxPropertySet, FbxPropertyValue},
        FbxComponent, FbxObject,
    },
};
use nalgebra::Vector3;

/// Texture binding points a material exposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxTextureKind {
    Diffuse = 0,
    Normal = 1,
}

pub const TEXTURE_KIND_COUNT: usize = 2;

pub struct FbxMaterial {
    pub base: FbxObject,
    textures: [Handle<FbxComponent>; TEXTURE_KIND_COUNT],
}

impl FbxMaterial {
    pub fn new(mut base: FbxObject) -> Self {
        declare_material_properties(&mut base.properties);
        FbxMaterial {
            base,
            textures: [Handle::NONE; TEXTURE_KIND_COUNT],
        }
    }

    pub fn texture(&self, kind: FbxTextureKind) -> Handle<FbxComponent> {
        self.textures[kind as usize]
    }

    /// Binds a texture into the slot named by the connection property.
    /// Returns an error message on a double bind; unknown slot names are
    /// ignored.
    pub(crate) fn assign_texture(
        &mut self,
        property: &str,
        texture: Handle<FbxComponent>,
    ) -> Result<(), String> {
        let kind = match property {
            "DiffuseColor" => FbxTextureKind::Diffuse,
            "NormalMap" => FbxTextureKind::Normal,
            _ => return Ok(()),
        };
        if self.textures[kind as usize].is_some() {
            return Err(String::from("Invalid material"));
        }
        self.textures[kind as usize] = texture;
        Ok(())
    }

    pub fn diffuse_color(&self) -> Vector3<f64> {
        self.base.properties.vec3_of("DiffuseColor")
    }

    pub fn diffuse_factor(&self) -> f64 {
        self.base.properties.double_of("DiffuseFactor")
    }
}

fn declare_material_properties(properties: &mut FbxPropertySet) {
    let white = Vector3::new(1.0, 1.0, 1.0);
    let black = Vector3::zeros();

    properties.declare_animatable("AmbientColor", FbxPropertyValue::Color(black));
    properties.declare_animatable("AmbientFactor", FbxPropertyValue::Double(1.0));
    properties.declare_animatable("EmissiveColor", FbxPropertyValue::Color(black));
    properties.declare_animatable("EmissiveFactor", FbxPropertyValue::Double(1.0));
    properties.declare_animatable("DiffuseColor", FbxPropertyValue::Color(white));
    properties.declare_animatable("DiffuseFactor", FbxPropertyValue::Double(1.0));
    properties.declare_animatable("SpecularColor", FbxPropertyValue::Color(white));
    properties.declare_animatable("SpecularFactor", FbxPropertyValue::Double(1.0));
    properties.declare_animatable("TransparentColor", FbxPropertyValue::Color(black));
    properties.declare_animatable("TransparencyFactor", FbxPropertyValue::Double(0.0));
    properties.declare_animatable("Bump", FbxPropertyValue::Vector3(black));
    properties.declare_animatable("BumpFactor", FbxPropertyValue::Double(1.0));
    properties.declare_animatable("NormalMap", FbxPropertyValue::Vector3(black));
    properties.declare_animatable("ReflectionColor", FbxPropertyValue::Color(black));
    properties.declare_animatable("ReflectionFactor", FbxPropertyValue::Double(1.0));
    properties.declare_animatable("DisplacementColor", FbxPropertyValue::Color(black));
    properties.declare_animatable("DisplacementFactor", FbxPropertyValue::Double(1.0));
    properties.declare_animatable("Shininess", FbxPropertyValue::Double(20.0));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pool::Pool;
    use crate::scene::FbxShader;

    #[test]
    fn texture_slots_bind_once() {
        let mut pool: Pool<FbxComponent> = Pool::new();
        let first = pool.spawn(FbxComponent::Shader(FbxShader {
            base: FbxObject::unattached("a"),
        }));
        let second = pool.spawn(FbxComponent::Shader(FbxShader {
            base: FbxObject::unattached("b"),
        }));

        let mut material = FbxMaterial::new(FbxObject::unattached("mat"));
        assert!(material.texture(FbxTextureKind::Diffuse).is_none());

        material.assign_texture("DiffuseColor", first).unwrap();
        assert_eq!(material.texture(FbxTextureKind::Diffuse), first);
        assert!(material.assign_texture("DiffuseColor", second).is_err());

        // Unknown slots are ignored silently.
        material.assign_texture("AmbientColor", second).unwrap();
    }

    #[test]
    fn palette_defaults() {
        let material = FbxMaterial::new(FbxObject::unattached("mat"));
        assert_eq!(material.diffuse_color(), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(material.diffuse_factor(), 1.0);
        assert_eq!(material.base.properties.double_of("Shininess"), 20.0);
    }
}
