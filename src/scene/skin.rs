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

//! Skinning: a skin owns the clusters deforming one geometry; a cluster
//! binds one bone to a weighted set of vertices. Cluster indices arrive in
//! control-point space and are expanded to triangulated-corner space during
//! post-processing.

use crate::{
    document::{FbxNode, FbxNodeContainer},
    error::FbxError,
    pool::Handle,
    scene::{
        geometry::{read_f64_array, read_i32_array, FbxGeometry},
        FbxComponent, FbxObject,
    },
};
use nalgebra::Matrix4;

pub struct FbxSkin {
    pub base: FbxObject,
    pub clusters: Vec<Handle<FbxComponent>>,
    /// Geometry this skin deforms; set when the geometry-skin connection is
    /// resolved.
    pub geometry: Handle<FbxComponent>,
}

impl FbxSkin {
    pub fn new(base: FbxObject) -> Self {
        FbxSkin {
            base,
            clusters: Vec::new(),
            geometry: Handle::NONE,
        }
    }
}

pub struct FbxCluster {
    pub base: FbxObject,
    /// Bone this cluster follows.
    pub link: Handle<FbxComponent>,
    pub skin: Handle<FbxComponent>,
    /// Mesh-to-world at bind time.
    pub transform_matrix: Matrix4<f64>,
    /// Bone-to-world at bind time.
    pub transform_link_matrix: Matrix4<f64>,
    /// Parallel arrays in triangulated vertex space, filled by
    /// post-processing.
    pub indices: Vec<i32>,
    pub weights: Vec<f64>,
}

fn read_matrix(
    nodes: &FbxNodeContainer,
    cluster_handle: Handle<FbxNode>,
    name: &str,
) -> Result<Matrix4<f64>, FbxError> {
    match read_f64_array(nodes, cluster_handle, name) {
        Ok(values) => {
            if values.len() != 16 {
                return Err(format!("Failed to parse {name}").into());
            }
            Ok(Matrix4::from_column_slice(&values))
        }
        Err(_) => Ok(Matrix4::identity()),
    }
}

impl FbxCluster {
    pub(crate) fn read(
        base: FbxObject,
        cluster_handle: Handle<FbxNode>,
        nodes: &FbxNodeContainer,
    ) -> Result<Self, FbxError> {
        Ok(FbxCluster {
            base,
            link: Handle::NONE,
            skin: Handle::NONE,
            transform_matrix: read_matrix(nodes, cluster_handle, "Transform")?,
            transform_link_matrix: read_matrix(nodes, cluster_handle, "TransformLink")?,
            indices: Vec::new(),
            weights: Vec::new(),
        })
    }

    /// Expands the control-point weights stored in the document into one
    /// entry per triangulated corner, using the geometry's vertex multimap.
    /// Control points with no corners are skipped.
    pub(crate) fn postprocess(
        &mut self,
        geometry: &FbxGeometry,
        nodes: &FbxNodeContainer,
    ) -> Result<(), FbxError> {
        let element = self.base.element;
        if element.is_none() {
            return Ok(());
        }

        let old_indices = read_i32_array(nodes, element, "Indexes").unwrap_or_default();
        let old_weights = read_f64_array(nodes, element, "Weights").unwrap_or_default();

        if old_indices.len() != old_weights.len() {
            return Err(String::from("Failed to postprocess cluster").into());
        }

        self.indices.reserve(old_indices.len());
        self.weights.reserve(old_weights.len());
        for (&old_index, &weight) in old_indices.iter().zip(old_weights.iter()) {
            let Ok(old_index) = usize::try_from(old_index) else {
                continue;
            };
            let Some(new_vertices) = geometry.to_new_vertices.get(old_index) else {
                continue;
            };
            for &new_index in new_vertices {
                self.indices.push(new_index);
                self.weights.push(weight);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::FbxDocument;

    #[test]
    fn bind_matrices_default_to_identity() {
        let text = "Deformer: 300, \"SubDeformer::\", \"Cluster\" {\n}\n";
        let doc = FbxDocument::from_memory(text.as_bytes()).unwrap();
        let handle = doc.nodes().find(doc.root(), "Deformer").unwrap();
        let cluster =
            FbxCluster::read(FbxObject::unattached("cluster"), handle, doc.nodes()).unwrap();
        assert_eq!(cluster.transform_matrix, Matrix4::identity());
        assert_eq!(cluster.transform_link_matrix, Matrix4::identity());
    }

    #[test]
    fn bind_matrix_is_column_major() {
        let mut text = String::from("Deformer: 300, \"SubDeformer::\", \"Cluster\" {\n\tTransform: *16 {\n\t\ta: ");
        let values: Vec<String> = (1..=16).map(|v| v.to_string()).collect();
        text.push_str(&values.join(","));
        text.push_str("\n\t}\n}\n");

        let doc = FbxDocument::from_memory(text.as_bytes()).unwrap();
        let handle = doc.nodes().find(doc.root(), "Deformer").unwrap();
        let cluster =
            FbxCluster::read(FbxObject::unattached("cluster"), handle, doc.nodes()).unwrap();
        assert_eq!(cluster.transform_matrix[(0, 0)], 1.0);
        assert_eq!(cluster.transform_matrix[(1, 0)], 2.0);
        assert_eq!(cluster.transform_matrix[(0, 1)], 5.0);
        assert_eq!(cluster.transform_matrix[(3, 3)], 16.0);
    }
}
