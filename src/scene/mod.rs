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

//! FBX scene: strongly typed components assembled from the generic document
//! tree, wired together by the document's flat `Connections` table, and
//! evaluable over time.

pub mod animation;
pub mod camera;
pub mod geometry;
pub mod light;
pub mod material;
pub mod model;
pub mod properties;
pub mod skin;
pub mod texture;

use crate::{
    document::{FbxDocument, FbxNode, FbxNodeContainer},
    error::FbxError,
    pool::{Handle, Pool},
    scene::{
        animation::{
            FbxAnimationCurve, FbxAnimationCurveNode, FbxAnimationCurveNodeType,
            FbxAnimationLayer, FbxAnimationStack, FbxTakeInfo,
        },
        camera::FbxCamera,
        geometry::FbxGeometry,
        material::FbxMaterial,
        model::{FbxModel, FbxModelKind},
        properties::FbxPropertySet,
        skin::{FbxCluster, FbxSkin},
        texture::FbxTexture,
    },
};
use fxhash::FxHashMap;
use nalgebra::{Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};

/// FBX time is measured in integer ticks.
pub const FBX_TICKS_PER_SECOND: i64 = 46_186_158_000;

/// A point in time in FBX tick space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FbxTime(i64);

impl FbxTime {
    pub fn new(ticks: i64) -> Self {
        Self(ticks)
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * FBX_TICKS_PER_SECOND as f64) as i64)
    }

    pub fn ticks(self) -> i64 {
        self.0
    }

    pub fn seconds(self) -> f64 {
        self.0 as f64 / FBX_TICKS_PER_SECOND as f64
    }
}

/// How a per-vertex attribute layer maps onto the geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxMapping {
    Unknown,
    ByPolygon,
    ByPolygonVertex,
    ByVertex,
    AllSame,
}

/// How a layer's values are referenced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxReference {
    Unknown,
    Direct,
    IndexToDirect,
}

pub fn string_to_mapping(value: &str) -> FbxMapping {
    match value {
        "ByPolygon" => FbxMapping::ByPolygon,
        "ByPolygonVertex" => FbxMapping::ByPolygonVertex,
        "ByVertex" | "ByVertice" => FbxMapping::ByVertex,
        "AllSame" => FbxMapping::AllSame,
        _ => FbxMapping::Unknown,
    }
}

pub fn string_to_reference(value: &str) -> FbxReference {
    match value {
        "Direct" => FbxReference::Direct,
        "IndexToDirect" | "Index" => FbxReference::IndexToDirect,
        _ => FbxReference::Unknown,
    }
}

/// Header shared by every scene object: the file-assigned id (zero is
/// reserved for the synthetic root), the display name, the element the
/// object was built from, its optional node attribute satellite and the
/// typed property slots.
pub struct FbxObject {
    pub id: i64,
    pub name: String,
    pub element: Handle<FbxNode>,
    pub node_attribute: Handle<FbxComponent>,
    pub properties: FbxPropertySet,
}

impl FbxObject {
    pub(crate) fn new(id: i64, name: String, element: Handle<FbxNode>) -> Self {
        FbxObject {
            id,
            name,
            element,
            node_attribute: Handle::NONE,
            properties: FbxPropertySet::new(),
        }
    }

    pub(crate) fn unattached(name: &str) -> Self {
        Self::new(0, name.to_string(), Handle::NONE)
    }
}

/// Object names are stored as `Class::name` in ASCII documents (binary ones
/// carry a null separator the tokenizer already cut at).
fn object_name(element: &FbxNode) -> String {
    let raw = match element.get_attrib(1) {
        Ok(attrib) => attrib.as_string(),
        Err(_) => return String::from("Unnamed"),
    };
    match raw.rsplit_once("::") {
        Some((_, name)) => name.to_string(),
        None => raw,
    }
}

pub struct FbxNodeAttribute {
    pub base: FbxObject,
    /// First `TypeFlags` property, e.g. `Skeleton` or `Camera`.
    pub attribute_type: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxConstraintKind {
    Position,
    Generic,
}

pub struct FbxConstraint {
    pub base: FbxObject,
    pub kind: FbxConstraintKind,
}

impl FbxConstraint {
    fn new(mut base: FbxObject, kind: FbxConstraintKind) -> Self {
        base.properties
            .declare("Active", properties::FbxPropertyValue::Bool(true));
        base.properties
            .declare("Weight", properties::FbxPropertyValue::Double(100.0));
        FbxConstraint { base, kind }
    }
}

pub struct FbxShader {
    pub base: FbxObject,
}

/// Discriminator for [`FbxComponent`], used by the connection routing table
/// and the link resolution queries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxComponentKind {
    Model,
    Geometry,
    Material,
    Texture,
    Skin,
    Cluster,
    NodeAttribute,
    AnimationStack,
    AnimationLayer,
    AnimationCurveNode,
    AnimationCurve,
    Constraint,
    Shader,
}

pub enum FbxComponent {
    Model(Box<FbxModel>),
    Geometry(Box<FbxGeometry>),
    Material(FbxMaterial),
    Texture(FbxTexture),
    Skin(FbxSkin),
    Cluster(FbxCluster),
    NodeAttribute(FbxNodeAttribute),
    AnimationStack(FbxAnimationStack),
    AnimationLayer(FbxAnimationLayer),
    AnimationCurveNode(FbxAnimationCurveNode),
    AnimationCurve(FbxAnimationCurve),
    Constraint(FbxConstraint),
    Shader(FbxShader),
}

impl FbxComponent {
    pub fn kind(&self) -> FbxComponentKind {
        match self {
            FbxComponent::Model(_) => FbxComponentKind::Model,
            FbxComponent::Geometry(_) => FbxComponentKind::Geometry,
            FbxComponent::Material(_) => FbxComponentKind::Material,
            FbxComponent::Texture(_) => FbxComponentKind::Texture,
            FbxComponent::Skin(_) => FbxComponentKind::Skin,
            FbxComponent::Cluster(_) => FbxComponentKind::Cluster,
            FbxComponent::NodeAttribute(_) => FbxComponentKind::NodeAttribute,
            FbxComponent::AnimationStack(_) => FbxComponentKind::AnimationStack,
            FbxComponent::AnimationLayer(_) => FbxComponentKind::AnimationLayer,
            FbxComponent::AnimationCurveNode(_) => FbxComponentKind::AnimationCurveNode,
            FbxComponent::AnimationCurve(_) => FbxComponentKind::AnimationCurve,
            FbxComponent::Constraint(_) => FbxComponentKind::Constraint,
            FbxComponent::Shader(_) => FbxComponentKind::Shader,
        }
    }

    pub fn base(&self) -> &FbxObject {
        match self {
            FbxComponent::Model(v) => &v.base,
            FbxComponent::Geometry(v) => &v.base,
            FbxComponent::Material(v) => &v.base,
            FbxComponent::Texture(v) => &v.base,
            FbxComponent::Skin(v) => &v.base,
            FbxComponent::Cluster(v) => &v.base,
            FbxComponent::NodeAttribute(v) => &v.base,
            FbxComponent::AnimationStack(v) => &v.base,
            FbxComponent::AnimationLayer(v) => &v.base,
            FbxComponent::AnimationCurveNode(v) => &v.base,
            FbxComponent::AnimationCurve(v) => &v.base,
            FbxComponent::Constraint(v) => &v.base,
            FbxComponent::Shader(v) => &v.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut FbxObject {
        match self {
            FbxComponent::Model(v) => &mut v.base,
            FbxComponent::Geometry(v) => &mut v.base,
            FbxComponent::Material(v) => &mut v.base,
            FbxComponent::Texture(v) => &mut v.base,
            FbxComponent::Skin(v) => &mut v.base,
            FbxComponent::Cluster(v) => &mut v.base,
            FbxComponent::NodeAttribute(v) => &mut v.base,
            FbxComponent::AnimationStack(v) => &mut v.base,
            FbxComponent::AnimationLayer(v) => &mut v.base,
            FbxComponent::AnimationCurveNode(v) => &mut v.base,
            FbxComponent::AnimationCurve(v) => &mut v.base,
            FbxComponent::Constraint(v) => &mut v.base,
            FbxComponent::Shader(v) => &mut v.base,
        }
    }

    /// Whether this component takes part in the node hierarchy.
    pub fn is_node(&self) -> bool {
        matches!(self, FbxComponent::Model(_))
    }

    pub fn as_model(&self) -> Result<&FbxModel, FbxError> {
        if let FbxComponent::Model(model) = self {
            Ok(model)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_model_mut(&mut self) -> Result<&mut FbxModel, FbxError> {
        if let FbxComponent::Model(model) = self {
            Ok(model)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_geometry(&self) -> Result<&FbxGeometry, FbxError> {
        if let FbxComponent::Geometry(geometry) = self {
            Ok(geometry)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_geometry_mut(&mut self) -> Result<&mut FbxGeometry, FbxError> {
        if let FbxComponent::Geometry(geometry) = self {
            Ok(geometry)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_material(&self) -> Result<&FbxMaterial, FbxError> {
        if let FbxComponent::Material(material) = self {
            Ok(material)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_material_mut(&mut self) -> Result<&mut FbxMaterial, FbxError> {
        if let FbxComponent::Material(material) = self {
            Ok(material)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_texture(&self) -> Result<&FbxTexture, FbxError> {
        if let FbxComponent::Texture(texture) = self {
            Ok(texture)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_skin(&self) -> Result<&FbxSkin, FbxError> {
        if let FbxComponent::Skin(skin) = self {
            Ok(skin)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_skin_mut(&mut self) -> Result<&mut FbxSkin, FbxError> {
        if let FbxComponent::Skin(skin) = self {
            Ok(skin)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_cluster(&self) -> Result<&FbxCluster, FbxError> {
        if let FbxComponent::Cluster(cluster) = self {
            Ok(cluster)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_cluster_mut(&mut self) -> Result<&mut FbxCluster, FbxError> {
        if let FbxComponent::Cluster(cluster) = self {
            Ok(cluster)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_animation_stack(&self) -> Result<&FbxAnimationStack, FbxError> {
        if let FbxComponent::AnimationStack(stack) = self {
            Ok(stack)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_animation_stack_mut(&mut self) -> Result<&mut FbxAnimationStack, FbxError> {
        if let FbxComponent::AnimationStack(stack) = self {
            Ok(stack)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_animation_layer(&self) -> Result<&FbxAnimationLayer, FbxError> {
        if let FbxComponent::AnimationLayer(layer) = self {
            Ok(layer)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_animation_layer_mut(&mut self) -> Result<&mut FbxAnimationLayer, FbxError> {
        if let FbxComponent::AnimationLayer(layer) = self {
            Ok(layer)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_animation_curve_node(&self) -> Result<&FbxAnimationCurveNode, FbxError> {
        if let FbxComponent::AnimationCurveNode(node) = self {
            Ok(node)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_animation_curve_node_mut(&mut self) -> Result<&mut FbxAnimationCurveNode, FbxError> {
        if let FbxComponent::AnimationCurveNode(node) = self {
            Ok(node)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }

    pub fn as_animation_curve(&self) -> Result<&FbxAnimationCurve, FbxError> {
        if let FbxComponent::AnimationCurve(curve) = self {
            Ok(curve)
        } else {
            Err(FbxError::UnexpectedType)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxConnectionKind {
    ObjectObject,
    ObjectProperty,
    PropertyProperty,
}

/// One edge of the document's flat connection table.
#[derive(Clone, Debug)]
pub struct FbxConnection {
    pub kind: FbxConnectionKind,
    pub from: i64,
    pub to: i64,
    /// Slot name on the destination for OP and PP edges.
    pub property: String,
    /// Source slot name of a PP edge; recorded, never interpreted.
    pub src_property: String,
}

/// What `model_vector` extracts from a transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FbxTransformComponent {
    Translation,
    Rotation,
    Scaling,
}

/// Ambient evaluation state consulted when a query omits an explicit time.
#[derive(Copy, Clone, Debug, Default)]
pub struct FbxEvaluationInfo {
    pub local_time: FbxTime,
    pub system_time: FbxTime,
    pub is_playing: bool,
}

pub struct FbxScene {
    document: FbxDocument,
    components: Pool<FbxComponent>,
    index_to_component: FxHashMap<i64, Handle<FbxComponent>>,
    all_objects: Vec<Handle<FbxComponent>>,
    root: Handle<FbxComponent>,
    meshes: Vec<Handle<FbxComponent>>,
    materials: Vec<Handle<FbxComponent>>,
    lights: Vec<Handle<FbxComponent>>,
    cameras: Vec<Handle<FbxComponent>>,
    constraints: Vec<Handle<FbxComponent>>,
    shaders: Vec<Handle<FbxComponent>>,
    animation_stacks: Vec<Handle<FbxComponent>>,
    connections: Vec<FbxConnection>,
    take_infos: Vec<FbxTakeInfo>,
    frame_rate: f32,
    evaluation_info: FbxEvaluationInfo,
}

impl FbxScene {
    /// Assembles a scene from a tokenized document: factory pass over
    /// `Objects`, connection resolution, property retrieval, cluster
    /// post-processing and layer ordering.
    pub fn new(document: FbxDocument) -> Result<Self, FbxError> {
        let connections = parse_connections(&document)?;
        let take_infos = parse_takes(&document)?;
        let frame_rate = parse_global_settings(&document);

        let mut scene = FbxScene {
            document,
            components: Pool::new(),
            index_to_component: FxHashMap::default(),
            all_objects: Vec::new(),
            root: Handle::NONE,
            meshes: Vec::new(),
            materials: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
            constraints: Vec::new(),
            shaders: Vec::new(),
            animation_stacks: Vec::new(),
            connections,
            take_infos,
            frame_rate,
            evaluation_info: FbxEvaluationInfo::default(),
        };

        scene.parse_objects()?;
        scene.resolve_connections()?;
        scene.retrieve_properties();
        scene.postprocess_clusters()?;
        scene.sort_stack_layers();

        Ok(scene)
    }

    fn parse_objects(&mut self) -> Result<(), FbxError> {
        let root_model = FbxModel::new(
            FbxObject::new(0, String::from("RootNode"), Handle::NONE),
            FbxModelKind::Root,
        );
        self.root = self.components.spawn(FbxComponent::Model(Box::new(root_model)));
        self.index_to_component.insert(0, self.root);
        self.all_objects.push(self.root);

        let nodes = self.document.nodes();
        let Ok(objects_handle) = nodes.find(self.document.root(), "Objects") else {
            return Ok(());
        };

        let object_handles: Vec<Handle<FbxNode>> =
            nodes.get(objects_handle).children().to_vec();

        for element_handle in object_handles {
            let element = nodes.get(element_handle);
            let id = element
                .get_attrib(0)
                .and_then(|attrib| attrib.as_i64())
                .map_err(|_| String::from("Invalid object id"))?;
            let base = FbxObject::new(id, object_name(element), element_handle);
            let class = element
                .get_attrib(2)
                .map(|attrib| attrib.as_string())
                .unwrap_or_default();

            let component = match element.name() {
                "Geometry" => {
                    let is_mesh = element
                        .attributes()
                        .last()
                        .map(|attrib| attrib.as_string() == "Mesh")
                        .unwrap_or(false);
                    if is_mesh {
                        Some(FbxComponent::Geometry(Box::new(FbxGeometry::read(
                            base,
                            element_handle,
                            nodes,
                        )?)))
                    } else {
                        None
                    }
                }
                "Material" => Some(FbxComponent::Material(FbxMaterial::new(base))),
                "Texture" => Some(FbxComponent::Texture(FbxTexture::read(
                    base,
                    element_handle,
                    nodes,
                )?)),
                "NodeAttribute" => {
                    let attribute_type = nodes
                        .get_by_name(element_handle, "TypeFlags")
                        .ok()
                        .and_then(|flags| flags.get_attrib(0).ok().map(|a| a.as_string()))
                        .unwrap_or_default();
                    Some(FbxComponent::NodeAttribute(FbxNodeAttribute {
                        base,
                        attribute_type,
                    }))
                }
                "Deformer" => match class.as_str() {
                    "Cluster" => Some(FbxComponent::Cluster(FbxCluster::read(
                        base,
                        element_handle,
                        nodes,
                    )?)),
                    "Skin" => Some(FbxComponent::Skin(FbxSkin::new(base))),
                    _ => None,
                },
                "Model" => {
                    let kind = match class.as_str() {
                        "Mesh" => Some(FbxModelKind::Mesh),
                        "LimbNode" => Some(FbxModelKind::LimbNode),
                        "Null" | "Root" => Some(FbxModelKind::Null),
                        "Camera" => Some(FbxModelKind::Camera),
                        "Light" => Some(FbxModelKind::Light),
                        _ => None,
                    };
                    kind.map(|kind| FbxComponent::Model(Box::new(FbxModel::new(base, kind))))
                }
                "AnimationStack" => Some(FbxComponent::AnimationStack(FbxAnimationStack::read(
                    base,
                    element_handle,
                    nodes,
                )?)),
                "AnimationLayer" => {
                    Some(FbxComponent::AnimationLayer(FbxAnimationLayer::new(base)))
                }
                "AnimationCurveNode" => Some(FbxComponent::AnimationCurveNode(
                    FbxAnimationCurveNode::new(base),
                )),
                "AnimationCurve" => Some(FbxComponent::AnimationCurve(FbxAnimationCurve::read(
                    base,
                    element_handle,
                    nodes,
                )?)),
                "Constraint" => {
                    let kind = if class == "Position From Positions" {
                        FbxConstraintKind::Position
                    } else {
                        FbxConstraintKind::Generic
                    };
                    Some(FbxComponent::Constraint(FbxConstraint::new(base, kind)))
                }
                "MotionBuilder_Generic" => read_generic(base, element_handle, nodes),
                _ => None,
            };

            let Some(component) = component else {
                continue;
            };

            let kind = component.kind();
            let model_kind = if let FbxComponent::Model(model) = &component {
                Some(model.kind)
            } else {
                None
            };
            let handle = self.components.spawn(component);
            self.index_to_component.insert(id, handle);
            self.all_objects.push(handle);

            match kind {
                FbxComponentKind::Material => self.materials.push(handle),
                FbxComponentKind::AnimationStack => self.animation_stacks.push(handle),
                FbxComponentKind::Constraint => self.constraints.push(handle),
                FbxComponentKind::Shader => self.shaders.push(handle),
                FbxComponentKind::Model => match model_kind {
                    Some(FbxModelKind::Mesh) => self.meshes.push(handle),
                    Some(FbxModelKind::Camera) => self.cameras.push(handle),
                    Some(FbxModelKind::Light) => self.lights.push(handle),
                    _ => (),
                },
                _ => (),
            }
        }

        Ok(())
    }

    /// Single forward pass over the connection table. Edges with a missing
    /// endpoint are dropped; structural double-bindings are fatal.
    fn resolve_connections(&mut self) -> Result<(), FbxError> {
        let connections = std::mem::take(&mut self.connections);

        for connection in connections.iter() {
            let Some(&child) = self.index_to_component.get(&connection.from) else {
                continue;
            };
            let Some(&parent) = self.index_to_component.get(&connection.to) else {
                continue;
            };
            if child == parent {
                continue;
            }
            self.link_child_with_parent_component(parent, child, connection)?;
        }

        self.connections = connections;
        Ok(())
    }

    fn link_child_with_parent_component(
        &mut self,
        parent: Handle<FbxComponent>,
        child: Handle<FbxComponent>,
        connection: &FbxConnection,
    ) -> Result<(), FbxError> {
        let child_kind = self.components.borrow(child).kind();
        let parent_kind = self.components.borrow(parent).kind();
        let property = connection.property.as_str();

        // OP edges bind the child into a named object-reference slot on
        // the parent; curve nodes and node attributes take the dedicated
        // routes below instead.
        if connection.kind == FbxConnectionKind::ObjectProperty
            && child_kind != FbxComponentKind::AnimationCurveNode
            && child_kind != FbxComponentKind::NodeAttribute
        {
            self.components
                .borrow_mut(parent)
                .base_mut()
                .properties
                .set_object(property, child);
        }

        match child_kind {
            FbxComponentKind::NodeAttribute => {
                let parent_base = self.components.borrow_mut(parent).base_mut();
                if parent_base.node_attribute.is_some() {
                    return Err(String::from("Invalid node attribute").into());
                }
                parent_base.node_attribute = child;
            }
            FbxComponentKind::AnimationCurveNode => {
                let (parent_component, child_component) =
                    self.components.borrow_two_mut((parent, child));
                let curve_node = child_component.as_animation_curve_node_mut()?;

                if let Ok(model) = parent_component.as_model_mut() {
                    curve_node.owner = parent;
                    curve_node.owner_property = property.to_string();
                    curve_node.actual_type =
                        FbxAnimationCurveNodeType::from_property_name(property);
                    model.animation_nodes.push(child);
                } else if connection.kind == FbxConnectionKind::ObjectProperty {
                    curve_node.owner = parent;
                    curve_node.owner_property = property.to_string();
                }

                if !property.is_empty() {
                    parent_component
                        .base_mut()
                        .properties
                        .attach_curve_node(property, child);
                }
            }
            _ => (),
        }

        match parent_kind {
            FbxComponentKind::Model => {
                let parent_model_kind = self.components.borrow(parent).as_model()?.kind;
                match child_kind {
                    FbxComponentKind::Geometry if parent_model_kind == FbxModelKind::Mesh => {
                        let model = self.components.borrow_mut(parent).as_model_mut()?;
                        if model.geometry.is_some() {
                            return Err(String::from("Invalid mesh").into());
                        }
                        model.geometry = child;
                    }
                    FbxComponentKind::Material if parent_model_kind == FbxModelKind::Mesh => {
                        self.components
                            .borrow_mut(parent)
                            .as_model_mut()?
                            .materials
                            .push(child);
                    }
                    FbxComponentKind::Model => {
                        let (parent_component, child_component) =
                            self.components.borrow_two_mut((parent, child));
                        parent_component.as_model_mut()?.children.push(child);
                        child_component.as_model_mut()?.parent = parent;
                    }
                    _ => (),
                }
            }
            FbxComponentKind::Skin => {
                if child_kind == FbxComponentKind::Cluster {
                    let (parent_component, child_component) =
                        self.components.borrow_two_mut((parent, child));
                    let cluster = child_component.as_cluster_mut()?;
                    if cluster.skin.is_some() {
                        return Err(String::from("Invalid cluster").into());
                    }
                    cluster.skin = parent;
                    parent_component.as_skin_mut()?.clusters.push(child);
                }
            }
            FbxComponentKind::Material => {
                if child_kind == FbxComponentKind::Texture {
                    self.components
                        .borrow_mut(parent)
                        .as_material_mut()?
                        .assign_texture(property, child)?;
                }
            }
            FbxComponentKind::Geometry => {
                if child_kind == FbxComponentKind::Skin {
                    let (parent_component, child_component) =
                        self.components.borrow_two_mut((parent, child));
                    parent_component.as_geometry_mut()?.skin = child;
                    child_component.as_skin_mut()?.geometry = parent;
                }
            }
            FbxComponentKind::Cluster => {
                if child_kind == FbxComponentKind::Model {
                    let child_model_kind = self.components.borrow(child).as_model()?.kind;
                    if matches!(
                        child_model_kind,
                        FbxModelKind::LimbNode | FbxModelKind::Mesh | FbxModelKind::Null
                    ) {
                        let cluster = self.components.borrow_mut(parent).as_cluster_mut()?;
                        if cluster.link.is_some() {
                            return Err(String::from("Invalid cluster").into());
                        }
                        cluster.link = child;
                    }
                }
            }
            FbxComponentKind::AnimationStack => {
                if child_kind == FbxComponentKind::AnimationLayer {
                    self.components
                        .borrow_mut(parent)
                        .as_animation_stack_mut()?
                        .layers
                        .push(child);
                }
            }
            FbxComponentKind::AnimationLayer => match child_kind {
                FbxComponentKind::AnimationCurveNode => {
                    let (parent_component, child_component) =
                        self.components.borrow_two_mut((parent, child));
                    parent_component
                        .as_animation_layer_mut()?
                        .curve_nodes
                        .push(child);
                    child_component.as_animation_curve_node_mut()?.layer = parent;
                }
                FbxComponentKind::AnimationLayer => {
                    let (parent_component, child_component) =
                        self.components.borrow_two_mut((parent, child));
                    parent_component
                        .as_animation_layer_mut()?
                        .sublayers
                        .push(child);
                    child_component.as_animation_layer_mut()?.parent_layer = parent;
                }
                _ => (),
            },
            FbxComponentKind::AnimationCurveNode => {
                if child_kind == FbxComponentKind::AnimationCurve {
                    let curve_node = self
                        .components
                        .borrow_mut(parent)
                        .as_animation_curve_node_mut()?;
                    if !curve_node.attach_curve(child) {
                        return Err(String::from("Invalid animation node").into());
                    }
                }
            }
            _ => (),
        }

        Ok(())
    }

    /// Copies property values from the element tree into the declared
    /// slots: node attribute values first, then the object's own block.
    fn retrieve_properties(&mut self) {
        let nodes = self.document.nodes();
        for &handle in self.all_objects.iter() {
            let node_attribute = self.components.borrow(handle).base().node_attribute;
            let attribute_element = self
                .components
                .try_borrow(node_attribute)
                .map(|component| component.base().element)
                .unwrap_or(Handle::NONE);

            for element in [attribute_element, self.components.borrow(handle).base().element] {
                if element.is_none() {
                    continue;
                }
                if let Ok(properties) = nodes.get_by_name(element, "Properties70") {
                    self.components
                        .borrow_mut(handle)
                        .base_mut()
                        .properties
                        .retrieve_from(properties, nodes);
                }
            }
        }
    }

    fn postprocess_clusters(&mut self) -> Result<(), FbxError> {
        let nodes = self.document.nodes();
        for index in 0..self.components.alive_count() {
            let handle = self.components.handle_at(index);
            if self.components.borrow(handle).kind() != FbxComponentKind::Cluster {
                continue;
            }

            let skin = self.components.borrow(handle).as_cluster()?.skin;
            let Some(skin_component) = self.components.try_borrow(skin) else {
                log::warn!("cluster without a skin, skipping weight expansion");
                continue;
            };
            let geometry = skin_component.as_skin()?.geometry;
            if self.components.try_borrow(geometry).is_none() {
                return Err(String::from("Failed to postprocess cluster").into());
            }

            let (cluster_component, geometry_component) =
                self.components.borrow_two_mut((handle, geometry));
            cluster_component
                .as_cluster_mut()?
                .postprocess(geometry_component.as_geometry()?, nodes)?;
        }
        Ok(())
    }

    /// Orders every stack's layer list by the user-assigned `LayerID`.
    fn sort_stack_layers(&mut self) {
        for &stack_handle in self.animation_stacks.iter() {
            let Ok(stack) = self.components.borrow(stack_handle).as_animation_stack() else {
                continue;
            };
            let mut keyed: Vec<(i32, Handle<FbxComponent>)> = stack
                .layers
                .iter()
                .map(|&layer| {
                    let id = self
                        .components
                        .borrow(layer)
                        .as_animation_layer()
                        .map(|layer| layer.layer_id())
                        .unwrap_or(0);
                    (id, layer)
                })
                .collect();
            keyed.sort_by_key(|(id, _)| *id);

            if let Ok(stack) = self
                .components
                .borrow_mut(stack_handle)
                .as_animation_stack_mut()
            {
                stack.layers = keyed.into_iter().map(|(_, layer)| layer).collect();
            }
        }
    }

    /// Rebuilds the per-property curve node chains for one animation stack:
    /// every chain is dropped, then each layer re-attaches its curve nodes
    /// in layer order.
    pub fn prep_take_connections(&mut self, stack_index: usize) -> Result<(), FbxError> {
        let &stack_handle = self
            .animation_stacks
            .get(stack_index)
            .ok_or(FbxError::IndexOutOfBounds)?;

        for index in 0..self.components.alive_count() {
            let handle = self.components.handle_at(index);
            self.components
                .borrow_mut(handle)
                .base_mut()
                .properties
                .detach_curve_nodes();
        }

        let layers = self
            .components
            .borrow(stack_handle)
            .as_animation_stack()?
            .layers
            .clone();

        let mut attachments = Vec::new();
        for layer_handle in layers {
            let layer = self.components.borrow(layer_handle).as_animation_layer()?;
            for &curve_node_handle in layer.curve_nodes.iter() {
                let curve_node = self
                    .components
                    .borrow(curve_node_handle)
                    .as_animation_curve_node()?;
                if curve_node.owner.is_some() && !curve_node.owner_property.is_empty() {
                    attachments.push((
                        curve_node.owner,
                        curve_node.owner_property.clone(),
                        curve_node_handle,
                    ));
                }
            }
        }

        for (owner, property, curve_node) in attachments {
            self.components
                .borrow_mut(owner)
                .base_mut()
                .properties
                .attach_curve_node(&property, curve_node);
        }

        Ok(())
    }

    fn eval_time(&self, time: Option<FbxTime>) -> FbxTime {
        time.unwrap_or(self.evaluation_info.local_time)
    }

    /// Samples an animatable vector slot: the base layer's curve node wins,
    /// the static slot value is the fallback.
    pub fn sample_vec3(&self, object: Handle<FbxComponent>, name: &str, time: FbxTime) -> Vector3<f64> {
        let base = self.components.borrow(object).base();
        let Some(slot) = base.properties.find(name) else {
            return Vector3::zeros();
        };
        match self.components.try_borrow(slot.first_curve_node()) {
            Some(FbxComponent::AnimationCurveNode(curve_node)) => {
                curve_node.eval_vec3(&self.components, time)
            }
            _ => base.properties.vec3_of(name),
        }
    }

    /// Samples an animatable scalar slot.
    pub fn sample_double(&self, object: Handle<FbxComponent>, name: &str, time: FbxTime) -> f64 {
        let base = self.components.borrow(object).base();
        let Some(slot) = base.properties.find(name) else {
            return 0.0;
        };
        match self.components.try_borrow(slot.first_curve_node()) {
            Some(FbxComponent::AnimationCurveNode(curve_node)) => {
                curve_node.eval_value(&self.components, time)
            }
            _ => base.properties.double_of(name),
        }
    }

    /// Local transform of a model at `time`, animation applied. Cached on
    /// the node under its own time stamp.
    pub fn local_transform(
        &self,
        model: Handle<FbxComponent>,
        time: Option<FbxTime>,
    ) -> Matrix4<f64> {
        let time = self.eval_time(time);
        let Ok(model_ref) = self.components.borrow(model).as_model() else {
            return Matrix4::identity();
        };
        if model_ref.cache.local_time.get() == time.ticks() {
            return model_ref.cache.local.get();
        }
        let local = model_ref.eval_local(
            self.sample_vec3(model, "Lcl Translation", time),
            self.sample_vec3(model, "Lcl Rotation", time),
            self.sample_vec3(model, "Lcl Scaling", time),
        );
        model_ref.cache.local.set(local);
        model_ref.cache.local_time.set(time.ticks());
        local
    }

    /// Composed parent-to-world transform, cached per node by time; any
    /// time change recomputes.
    pub fn global_transform(
        &self,
        model: Handle<FbxComponent>,
        time: Option<FbxTime>,
    ) -> Matrix4<f64> {
        let time = self.eval_time(time);
        let Ok(model_ref) = self.components.borrow(model).as_model() else {
            return Matrix4::identity();
        };

        if model_ref.cache.global_time.get() != time.ticks() {
            let local = self.local_transform(model, Some(time));

            let parent = model_ref.parent;
            let global = if self
                .components
                .try_borrow(parent)
                .map(FbxComponent::is_node)
                .unwrap_or(false)
            {
                self.global_transform(parent, Some(time)) * local
            } else {
                local
            };
            model_ref.cache.global.set(global);
            model_ref.cache.global_time.set(time.ticks());
        }

        model_ref.cache.global.get()
    }

    /// Translation/rotation/scaling of a model, either local (sampled
    /// slots) or extracted from the global matrix. Global rotation is
    /// reported as zero and global scaling comes from column norms, which
    /// loses sign for negative scales.
    pub fn model_vector(
        &self,
        model: Handle<FbxComponent>,
        what: FbxTransformComponent,
        global: bool,
        time: Option<FbxTime>,
    ) -> Vector3<f64> {
        if global {
            let matrix = self.global_transform(model, time);
            match what {
                FbxTransformComponent::Translation => {
                    Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
                }
                FbxTransformComponent::Rotation => Vector3::zeros(),
                FbxTransformComponent::Scaling => Vector3::new(
                    matrix.fixed_view::<3, 1>(0, 0).norm(),
                    matrix.fixed_view::<3, 1>(0, 1).norm(),
                    matrix.fixed_view::<3, 1>(0, 2).norm(),
                ),
            }
        } else {
            let time = self.eval_time(time);
            match what {
                FbxTransformComponent::Translation => {
                    self.sample_vec3(model, "Lcl Translation", time)
                }
                FbxTransformComponent::Rotation => self.sample_vec3(model, "Lcl Rotation", time),
                FbxTransformComponent::Scaling => self.sample_vec3(model, "Lcl Scaling", time),
            }
        }
    }

    /// Rotation of the global transform as a quaternion, derived from the
    /// scale-normalized basis.
    pub fn model_rotation(
        &self,
        model: Handle<FbxComponent>,
        time: Option<FbxTime>,
    ) -> UnitQuaternion<f64> {
        let matrix = self.global_transform(model, time);
        let mut basis = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        for mut column in basis.column_iter_mut() {
            let norm = column.norm();
            if norm > f64::EPSILON {
                column /= norm;
            }
        }
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis))
    }

    /// Visibility at `time`: the sampled `Visibility` slot gated by `Show`,
    /// inherited from the parent chain when `Visibility Inheritance` is on.
    pub fn is_visible(&self, model: Handle<FbxComponent>, time: Option<FbxTime>) -> bool {
        let Ok(model_ref) = self.components.borrow(model).as_model() else {
            return true;
        };
        let props = &model_ref.base.properties;
        let eval_time = self.eval_time(time);

        let mut visible = match props.find("Visibility") {
            Some(slot) => match self.components.try_borrow(slot.first_curve_node()) {
                Some(FbxComponent::AnimationCurveNode(curve_node)) => {
                    curve_node.eval_value(&self.components, eval_time) != 0.0
                }
                _ => props.bool_of("Visibility"),
            },
            None => true,
        };

        if !props.bool_of("Show") {
            visible = false;
        } else if props.bool_of("Visibility Inheritance") {
            let parent = model_ref.parent;
            if self
                .components
                .try_borrow(parent)
                .map(FbxComponent::is_node)
                .unwrap_or(false)
            {
                visible = self.is_visible(parent, time);
            }
        }

        visible
    }

    /// View matrix of a Camera kind model: eye at the global position,
    /// looking at the bound target or along the rotated forward axis.
    pub fn camera_view_matrix(
        &self,
        camera_model: Handle<FbxComponent>,
        time: Option<FbxTime>,
    ) -> Result<Matrix4<f64>, FbxError> {
        let model_ref = self.components.borrow(camera_model).as_model()?;
        let camera = FbxCamera::from_model(model_ref).ok_or(FbxError::UnexpectedType)?;

        let eye = self.model_vector(
            camera_model,
            FbxTransformComponent::Translation,
            true,
            time,
        );
        let up = camera.up_vector();

        let target = camera.target();
        let center = if self
            .components
            .try_borrow(target)
            .map(FbxComponent::is_node)
            .unwrap_or(false)
        {
            self.model_vector(target, FbxTransformComponent::Translation, true, time)
        } else {
            // A camera with zero rotation points along +X.
            let rotation = self.model_rotation(camera_model, time);
            eye + rotation.transform_vector(&Vector3::new(1.0, 0.0, 0.0))
        };

        Ok(Matrix4::look_at_rh(
            &Point3::from(eye),
            &Point3::from(center),
            &up,
        ))
    }

    pub fn set_evaluation_info(&mut self, info: FbxEvaluationInfo) {
        self.evaluation_info = info;
    }

    pub fn evaluation_info(&self) -> &FbxEvaluationInfo {
        &self.evaluation_info
    }

    // Indexed facade.

    pub fn get(&self, handle: Handle<FbxComponent>) -> &FbxComponent {
        self.components.borrow(handle)
    }

    pub fn try_get(&self, handle: Handle<FbxComponent>) -> Option<&FbxComponent> {
        self.components.try_borrow(handle)
    }

    pub fn components(&self) -> &Pool<FbxComponent> {
        &self.components
    }

    pub fn root(&self) -> Handle<FbxComponent> {
        self.root
    }

    pub fn root_element(&self) -> Handle<FbxNode> {
        self.document.root()
    }

    pub fn document(&self) -> &FbxDocument {
        &self.document
    }

    pub fn all_objects(&self) -> &[Handle<FbxComponent>] {
        &self.all_objects
    }

    pub fn object_by_id(&self, id: i64) -> Handle<FbxComponent> {
        self.index_to_component
            .get(&id)
            .copied()
            .unwrap_or(Handle::NONE)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn mesh(&self, index: usize) -> Handle<FbxComponent> {
        self.meshes[index]
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn material(&self, index: usize) -> Handle<FbxComponent> {
        self.materials[index]
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn light(&self, index: usize) -> Handle<FbxComponent> {
        self.lights[index]
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn camera(&self, index: usize) -> Handle<FbxComponent> {
        self.cameras[index]
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraint(&self, index: usize) -> Handle<FbxComponent> {
        self.constraints[index]
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn shader(&self, index: usize) -> Handle<FbxComponent> {
        self.shaders[index]
    }

    pub fn animation_stack_count(&self) -> usize {
        self.animation_stacks.len()
    }

    pub fn animation_stack(&self, index: usize) -> Handle<FbxComponent> {
        self.animation_stacks[index]
    }

    /// Frame rate derived from the `TimeMode` global setting; -1 when the
    /// document carries none, -2 for the custom mode.
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn take_infos(&self) -> &[FbxTakeInfo] {
        &self.take_infos
    }

    pub fn take_info(&self, name: &str) -> Option<&FbxTakeInfo> {
        self.take_infos.iter().find(|info| info.name == name)
    }

    pub fn connections(&self) -> &[FbxConnection] {
        &self.connections
    }

    /// Linear scan for a node by display name.
    pub fn find_model_by_name(&self, name: &str) -> Handle<FbxComponent> {
        for &handle in self.all_objects.iter() {
            let component = self.components.borrow(handle);
            if component.is_node() && component.base().name == name {
                return handle;
            }
        }
        Handle::NONE
    }

    /// `index`-th object connected into `object`.
    pub fn resolve_object_link(&self, object: Handle<FbxComponent>, index: usize) -> Handle<FbxComponent> {
        let id = self.components.borrow(object).base().id;
        let mut remaining = index;
        for connection in self.connections.iter() {
            if connection.to == id && connection.from != 0 {
                if let Some(&handle) = self.index_to_component.get(&connection.from) {
                    if remaining == 0 {
                        return handle;
                    }
                    remaining -= 1;
                }
            }
        }
        Handle::NONE
    }

    /// `index`-th object of `kind` connected into `object`, optionally
    /// filtered by the connection's property name.
    pub fn resolve_object_link_by_kind(
        &self,
        object: Handle<FbxComponent>,
        kind: FbxComponentKind,
        property: Option<&str>,
        index: usize,
    ) -> Handle<FbxComponent> {
        let id = self.components.borrow(object).base().id;
        let mut remaining = index;
        for connection in self.connections.iter() {
            if connection.to != id || connection.from == 0 {
                continue;
            }
            if let Some(property) = property {
                if connection.property != property {
                    continue;
                }
            }
            if let Some(&handle) = self.index_to_component.get(&connection.from) {
                if self.components.borrow(handle).kind() == kind {
                    if remaining == 0 {
                        return handle;
                    }
                    remaining -= 1;
                }
            }
        }
        Handle::NONE
    }

    /// First object of `kind` that `object` is connected into (the reverse
    /// direction of [`Self::resolve_object_link`]).
    pub fn resolve_object_link_reverse(
        &self,
        object: Handle<FbxComponent>,
        kind: FbxComponentKind,
    ) -> Handle<FbxComponent> {
        let id = self.components.borrow(object).base().id;
        for connection in self.connections.iter() {
            if connection.from == id && connection.to != 0 {
                if let Some(&handle) = self.index_to_component.get(&connection.to) {
                    if self.components.borrow(handle).kind() == kind {
                        return handle;
                    }
                }
            }
        }
        Handle::NONE
    }
}

fn read_generic(
    base: FbxObject,
    element_handle: Handle<FbxNode>,
    nodes: &FbxNodeContainer,
) -> Option<FbxComponent> {
    let properties = nodes.get_by_name(element_handle, "Properties70").ok()?;
    for prop_handle in properties.children() {
        let prop = nodes.get(*prop_handle);
        if prop.name() == "P"
            && prop
                .get_attrib(0)
                .map(|a| a.as_string() == "MoBuTypeName")
                .unwrap_or(false)
            && prop
                .get_attrib(4)
                .map(|a| a.as_string() == "Shader")
                .unwrap_or(false)
        {
            return Some(FbxComponent::Shader(FbxShader { base }));
        }
    }
    None
}

fn parse_connections(document: &FbxDocument) -> Result<Vec<FbxConnection>, FbxError> {
    let nodes = document.nodes();
    let Ok(connections_handle) = nodes.find(document.root(), "Connections") else {
        return Ok(Vec::new());
    };

    let mut connections = Vec::new();
    for &connection_handle in nodes.get(connections_handle).children() {
        let connection = nodes.get(connection_handle);
        let kind = connection
            .get_attrib(0)
            .map_err(|_| String::from("Invalid connection"))?
            .as_string();

        let connection = match kind.as_str() {
            "OO" => FbxConnection {
                kind: FbxConnectionKind::ObjectObject,
                from: connection
                    .get_attrib(1)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid OO connection"))?,
                to: connection
                    .get_attrib(2)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid OO connection"))?,
                property: String::new(),
                src_property: String::new(),
            },
            "OP" => FbxConnection {
                kind: FbxConnectionKind::ObjectProperty,
                from: connection
                    .get_attrib(1)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid OP connection"))?,
                to: connection
                    .get_attrib(2)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid OP connection"))?,
                property: connection
                    .get_attrib(3)
                    .map_err(|_| String::from("Invalid OP connection"))?
                    .as_string(),
                src_property: String::new(),
            },
            "PP" => FbxConnection {
                kind: FbxConnectionKind::PropertyProperty,
                from: connection
                    .get_attrib(1)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid PP connection"))?,
                src_property: connection
                    .get_attrib(2)
                    .map_err(|_| String::from("Invalid PP connection"))?
                    .as_string(),
                to: connection
                    .get_attrib(3)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid PP connection"))?,
                property: connection
                    .get_attrib(4)
                    .map_err(|_| String::from("Invalid PP connection"))?
                    .as_string(),
            },
            _ => return Err(String::from("Not supported").into()),
        };
        connections.push(connection);
    }

    Ok(connections)
}

fn parse_takes(document: &FbxDocument) -> Result<Vec<FbxTakeInfo>, FbxError> {
    let nodes = document.nodes();
    let Ok(takes_handle) = nodes.find(document.root(), "Takes") else {
        return Ok(Vec::new());
    };

    let mut take_infos = Vec::new();
    for &take_handle in nodes.get(takes_handle).children() {
        let take = nodes.get(take_handle);
        if take.name() != "Take" {
            continue;
        }

        let name = take
            .get_attrib(0)
            .map_err(|_| String::from("Invalid name in take"))?
            .as_string();

        let mut info = FbxTakeInfo {
            name,
            filename: String::new(),
            local_time_from: 0.0,
            local_time_to: 0.0,
            reference_time_from: 0.0,
            reference_time_to: 0.0,
        };

        if let Ok(filename) = nodes.get_by_name(take_handle, "FileName") {
            info.filename = filename
                .get_attrib(0)
                .map_err(|_| String::from("Invalid filename in take"))?
                .as_string();
        }

        if let Ok(local_time) = nodes.get_by_name(take_handle, "LocalTime") {
            info.local_time_from = FbxTime::new(
                local_time
                    .get_attrib(0)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid local time in take"))?,
            )
            .seconds();
            info.local_time_to = FbxTime::new(
                local_time
                    .get_attrib(1)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid local time in take"))?,
            )
            .seconds();
        }

        if let Ok(reference_time) = nodes.get_by_name(take_handle, "ReferenceTime") {
            info.reference_time_from = FbxTime::new(
                reference_time
                    .get_attrib(0)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid reference time in take"))?,
            )
            .seconds();
            info.reference_time_to = FbxTime::new(
                reference_time
                    .get_attrib(1)
                    .and_then(|a| a.as_i64())
                    .map_err(|_| String::from("Invalid reference time in take"))?,
            )
            .seconds();
        }

        take_infos.push(info);
    }

    Ok(take_infos)
}

/// <http://docs.autodesk.com/FBX/2014/ENU/FBX-SDK-Documentation/> `FbxTime`
/// time mode table.
fn frame_rate_from_time_mode(time_mode: i32) -> f32 {
    match time_mode {
        0 => 1.0,
        1 => 120.0,
        2 => 100.0,
        3 => 60.0,
        4 => 50.0,
        5 => 48.0,
        6 => 30.0,
        7 => 30.0,
        8 => 29.970_026_2,
        9 => 29.970_026_2,
        10 => 25.0,
        11 => 24.0,
        12 => 1000.0,
        13 => 23.976,
        14 => -2.0,
        _ => -1.0,
    }
}

fn parse_global_settings(document: &FbxDocument) -> f32 {
    let nodes = document.nodes();
    let root = nodes.get(document.root());
    for &settings_handle in root.children() {
        if nodes.get(settings_handle).name() != "GlobalSettings" {
            continue;
        }
        let Ok(properties) = nodes.get_by_name(settings_handle, "Properties70") else {
            break;
        };
        for &prop_handle in properties.children() {
            let prop = nodes.get(prop_handle);
            let is_time_mode = prop
                .get_attrib(0)
                .map(|a| a.as_string() == "TimeMode")
                .unwrap_or(false);
            if is_time_mode {
                if let Ok(time_mode) = prop.get_attrib(4).and_then(|a| a.as_i32()) {
                    return frame_rate_from_time_mode(time_mode);
                }
                break;
            }
        }
        break;
    }
    -1.0
}
