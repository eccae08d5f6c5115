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

//! Typed property slots. Every scene object carries an ordered, name-keyed
//! set of slots declared with defaults at construction time; the retrieve
//! pass overwrites them from the element tree's `Properties70` block.
//! Animatable slots additionally hold the chain of animation curve nodes
//! attached to them, one entry per layer in layer order.

use crate::{
    document::{FbxNode, FbxNodeContainer},
    pool::Handle,
    scene::FbxComponent,
};
use nalgebra::Vector3;

#[derive(Clone, Debug, PartialEq)]
pub enum FbxPropertyValue {
    Bool(bool),
    Int(i32),
    Enum(i32),
    Double(f64),
    Vector3(Vector3<f64>),
    Color(Vector3<f64>),
    Object(Handle<FbxComponent>),
}

pub struct FbxPropertySlot {
    name: String,
    value: FbxPropertyValue,
    animatable: bool,
    curve_nodes: Vec<Handle<FbxComponent>>,
}

impl FbxPropertySlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &FbxPropertyValue {
        &self.value
    }

    pub fn is_animatable(&self) -> bool {
        self.animatable
    }

    /// Attached curve nodes, one per layer in layer order.
    pub fn curve_nodes(&self) -> &[Handle<FbxComponent>] {
        &self.curve_nodes
    }

    /// Curve node of the base layer, if any is attached.
    pub fn first_curve_node(&self) -> Handle<FbxComponent> {
        self.curve_nodes
            .first()
            .copied()
            .unwrap_or(Handle::NONE)
    }
}

#[derive(Default)]
pub struct FbxPropertySet {
    slots: Vec<FbxPropertySlot>,
}

impl FbxPropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, value: FbxPropertyValue) {
        self.slots.push(FbxPropertySlot {
            name: name.to_string(),
            value,
            animatable: false,
            curve_nodes: Vec::new(),
        });
    }

    pub fn declare_animatable(&mut self, name: &str, value: FbxPropertyValue) {
        self.slots.push(FbxPropertySlot {
            name: name.to_string(),
            value,
            animatable: true,
            curve_nodes: Vec::new(),
        });
    }

    pub fn find(&self, name: &str) -> Option<&FbxPropertySlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut FbxPropertySlot> {
        self.slots.iter_mut().find(|slot| slot.name == name)
    }

    pub fn slots(&self) -> &[FbxPropertySlot] {
        &self.slots
    }

    pub fn bool_of(&self, name: &str) -> bool {
        match self.find(name).map(FbxPropertySlot::value) {
            Some(FbxPropertyValue::Bool(v)) => *v,
            _ => false,
        }
    }

    pub fn int_of(&self, name: &str) -> i32 {
        match self.find(name).map(FbxPropertySlot::value) {
            Some(FbxPropertyValue::Int(v)) | Some(FbxPropertyValue::Enum(v)) => *v,
            _ => 0,
        }
    }

    pub fn double_of(&self, name: &str) -> f64 {
        match self.find(name).map(FbxPropertySlot::value) {
            Some(FbxPropertyValue::Double(v)) => *v,
            _ => 0.0,
        }
    }

    pub fn vec3_of(&self, name: &str) -> Vector3<f64> {
        match self.find(name).map(FbxPropertySlot::value) {
            Some(FbxPropertyValue::Vector3(v)) | Some(FbxPropertyValue::Color(v)) => *v,
            _ => Vector3::zeros(),
        }
    }

    pub fn object_of(&self, name: &str) -> Handle<FbxComponent> {
        match self.find(name).map(FbxPropertySlot::value) {
            Some(FbxPropertyValue::Object(v)) => *v,
            _ => Handle::NONE,
        }
    }

    /// Assigns an object reference slot. Slots of any other type, or unknown
    /// names, ignore the assignment.
    pub fn set_object(&mut self, name: &str, object: Handle<FbxComponent>) {
        if let Some(slot) = self.find_mut(name) {
            if matches!(slot.value, FbxPropertyValue::Object(_)) {
                slot.value = FbxPropertyValue::Object(object);
            }
        }
    }

    /// Extends the curve node chain of a matching animatable slot. Returns
    /// true when a slot accepted the attachment.
    pub fn attach_curve_node(&mut self, name: &str, curve_node: Handle<FbxComponent>) -> bool {
        if let Some(slot) = self.find_mut(name) {
            if slot.animatable {
                slot.curve_nodes.push(curve_node);
                return true;
            }
        }
        false
    }

    /// Drops every attached curve node chain; `prep_take_connections`
    /// rebuilds them per layer.
    pub fn detach_curve_nodes(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.curve_nodes.clear();
        }
    }

    /// Overwrites declared slots from a `Properties70` element. Each `P`
    /// child carries `[name, type, label, flags, values...]`; the slot's
    /// declared type decides how many value attributes are read. Unknown
    /// names and object references are left alone.
    pub fn retrieve_from(&mut self, properties: &FbxNode, nodes: &FbxNodeContainer) {
        for prop_handle in properties.children() {
            let prop = nodes.get(*prop_handle);
            let name = match prop.get_attrib(0) {
                Ok(attrib) => attrib.as_string(),
                Err(_) => continue,
            };
            let Some(slot) = self.find_mut(&name) else {
                continue;
            };
            match slot.value {
                FbxPropertyValue::Bool(_) => {
                    if let Ok(attrib) = prop.get_attrib(4) {
                        slot.value = FbxPropertyValue::Bool(attrib.as_bool());
                    }
                }
                FbxPropertyValue::Int(_) => {
                    if let Ok(v) = prop.get_attrib(4).and_then(|a| a.as_i32()) {
                        slot.value = FbxPropertyValue::Int(v);
                    }
                }
                FbxPropertyValue::Enum(_) => {
                    if let Ok(v) = prop.get_attrib(4).and_then(|a| a.as_i32()) {
                        slot.value = FbxPropertyValue::Enum(v);
                    }
                }
                FbxPropertyValue::Double(_) => {
                    if let Ok(v) = prop.get_attrib(4).and_then(|a| a.as_f64()) {
                        slot.value = FbxPropertyValue::Double(v);
                    }
                }
                FbxPropertyValue::Vector3(_) => {
                    if let Ok(v) = prop.get_vec3_at(4) {
                        slot.value = FbxPropertyValue::Vector3(v);
                    }
                }
                FbxPropertyValue::Color(_) => {
                    if let Ok(v) = prop.get_vec3_at(4) {
                        slot.value = FbxPropertyValue::Color(v);
                    }
                }
                FbxPropertyValue::Object(_) => (),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::FbxDocument;

    fn declare_set() -> FbxPropertySet {
        let mut set = FbxPropertySet::new();
        set.declare("RotationActive", FbxPropertyValue::Bool(false));
        set.declare("RotationOrder", FbxPropertyValue::Enum(0));
        set.declare_animatable(
            "Lcl Translation",
            FbxPropertyValue::Vector3(Vector3::zeros()),
        );
        set.declare("Intensity", FbxPropertyValue::Double(100.0));
        set
    }

    #[test]
    fn defaults_until_retrieved() {
        let set = declare_set();
        assert!(!set.bool_of("RotationActive"));
        assert_eq!(set.double_of("Intensity"), 100.0);
        assert_eq!(set.vec3_of("Lcl Translation"), Vector3::zeros());
    }

    #[test]
    fn retrieve_overwrites_declared_slots() {
        let text = "Properties70: {\n\
             \tP: \"Lcl Translation\", \"Lcl Translation\", \"\", \"A\", 1, 2, 3\n\
             \tP: \"RotationActive\", \"bool\", \"\", \"\", 1\n\
             \tP: \"Intensity\", \"Number\", \"\", \"A\", 55.5\n\
             \tP: \"SomethingUnknown\", \"bool\", \"\", \"\", 1\n\
             }\n";
        let doc = FbxDocument::from_memory(text.as_bytes()).unwrap();
        let props = doc.nodes().get_by_name(doc.root(), "Properties70").unwrap();

        let mut set = declare_set();
        set.retrieve_from(props, doc.nodes());

        assert!(set.bool_of("RotationActive"));
        assert_eq!(set.double_of("Intensity"), 55.5);
        assert_eq!(
            set.vec3_of("Lcl Translation"),
            Vector3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn curve_node_chain() {
        let mut set = declare_set();
        let a = Handle::NONE;
        assert!(!set.attach_curve_node("Intensity", a)); // not animatable
        assert!(set.attach_curve_node("Lcl Translation", a));
        assert_eq!(
            set.find("Lcl Translation").unwrap().curve_nodes().len(),
            1
        );
        set.detach_curve_nodes();
        assert!(set
            .find("Lcl Translation")
            .unwrap()
            .first_curve_node()
            .is_none());
    }
}
