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

//! Mesh geometry: control points, fan triangulation of the sign-terminated
//! polygon index stream, and per-corner attribute layers expanded to one
//! entry per triangulated vertex.

use crate::{
    document::{FbxNode, FbxNodeContainer},
    error::FbxError,
    pool::Handle,
    scene::{
        string_to_mapping, string_to_reference, FbxComponent, FbxMapping, FbxObject, FbxReference,
    },
};
use nalgebra::{Vector2, Vector3, Vector4};

pub struct FbxGeometry {
    pub base: FbxObject,
    /// One position per triangulated corner.
    pub vertices: Vec<Vector3<f64>>,
    /// Control point index each corner came from.
    pub to_old_vertices: Vec<i32>,
    /// All corners produced from a given control point; consumed by cluster
    /// post-processing to expand skin weights.
    pub to_new_vertices: Vec<Vec<i32>>,

    pub normals: Option<Vec<Vector3<f64>>>,
    pub uvs: Option<Vec<Vector2<f64>>>,
    pub colors: Option<Vec<Vector4<f64>>>,
    pub tangents: Option<Vec<Vector3<f64>>>,
    /// One material index per triangle.
    pub materials: Option<Vec<i32>>,

    pub skin: Handle<FbxComponent>,
}

fn fix_index(index: i32) -> i32 {
    if index < 0 {
        -index - 1
    } else {
        index
    }
}

/// Fans every polygon into triangles. Returns corner->control-point indices
/// and corner->polygon-vertex positions; the latter drives attribute
/// remapping so both stay in lockstep.
fn triangulate(old_indices: &[i32]) -> (Vec<i32>, Vec<i32>) {
    let mut to_old_vertices = Vec::with_capacity(old_indices.len());
    let mut to_old_indices = Vec::with_capacity(old_indices.len());

    let mut in_polygon_idx = 0usize;
    for (i, &raw) in old_indices.iter().enumerate() {
        let idx = fix_index(raw);
        if in_polygon_idx <= 2 {
            to_old_vertices.push(idx);
            to_old_indices.push(i as i32);
        } else {
            let first = i - in_polygon_idx;
            to_old_vertices.push(fix_index(old_indices[first]));
            to_old_indices.push(first as i32);
            to_old_vertices.push(fix_index(old_indices[i - 1]));
            to_old_indices.push((i - 1) as i32);
            to_old_vertices.push(idx);
            to_old_indices.push(i as i32);
        }
        in_polygon_idx += 1;
        if raw < 0 {
            in_polygon_idx = 0;
        }
    }

    (to_old_vertices, to_old_indices)
}

/// Triangle count of the polygon starting at `*idx` in the raw index
/// stream; advances `*idx` past the polygon.
fn get_tri_count_from_poly(indices: &[i32], idx: &mut usize) -> usize {
    let mut count = 1;
    while *idx + 1 + count < indices.len() && indices[*idx + 1 + count] >= 0 {
        count += 1;
    }
    *idx = *idx + 2 + count;
    count
}

/// Expands a raw attribute array to one entry per polygon vertex, honoring
/// the reference index array and the by-vertex folding of the negated last
/// index. Out-of-range references produce zeroed entries.
fn splat<T: Copy + Default>(
    mapping: FbxMapping,
    data: &[T],
    indices: &[i32],
    original_indices: &[i32],
) -> Vec<T> {
    match mapping {
        FbxMapping::ByPolygonVertex => {
            if indices.is_empty() {
                data.to_vec()
            } else {
                indices
                    .iter()
                    .map(|&i| {
                        usize::try_from(i)
                            .ok()
                            .and_then(|i| data.get(i))
                            .copied()
                            .unwrap_or_default()
                    })
                    .collect()
            }
        }
        FbxMapping::ByVertex => original_indices
            .iter()
            .map(|&raw| {
                data.get(fix_index(raw) as usize)
                    .copied()
                    .unwrap_or_default()
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn remap<T: Copy + Default>(out: &mut Vec<T>, map: &[i32]) {
    if out.is_empty() {
        return;
    }
    let old = std::mem::take(out);
    for &i in map {
        out.push(
            usize::try_from(i)
                .ok()
                .and_then(|i| old.get(i))
                .copied()
                .unwrap_or_default(),
        );
    }
}

fn read_array_node<'a>(
    nodes: &'a FbxNodeContainer,
    parent: Handle<FbxNode>,
    name: &str,
) -> Result<&'a FbxNode, String> {
    let data = nodes.find(parent, name)?;
    nodes.get_by_name(data, "a")
}

pub(crate) fn read_i32_array(
    nodes: &FbxNodeContainer,
    parent: Handle<FbxNode>,
    name: &str,
) -> Result<Vec<i32>, FbxError> {
    let array = read_array_node(nodes, parent, name)?;
    let mut out = Vec::with_capacity(array.attrib_count());
    for attrib in array.attributes() {
        out.push(attrib.as_i32()?);
    }
    Ok(out)
}

pub(crate) fn read_f64_array(
    nodes: &FbxNodeContainer,
    parent: Handle<FbxNode>,
    name: &str,
) -> Result<Vec<f64>, FbxError> {
    let array = read_array_node(nodes, parent, name)?;
    let mut out = Vec::with_capacity(array.attrib_count());
    for attrib in array.attributes() {
        out.push(attrib.as_f64()?);
    }
    Ok(out)
}

struct LayerData<T> {
    elements: Vec<T>,
    indices: Vec<i32>,
    mapping: FbxMapping,
}

/// Reads one attribute layer. `Ok(None)` means the layer is missing or uses
/// a mapping/reference combination this crate tolerates by skipping.
fn read_layer<T>(
    nodes: &FbxNodeContainer,
    geom_handle: Handle<FbxNode>,
    layer_names: &[&str],
    data_names: &[&str],
    index_names: &[&str],
    stride: usize,
    make: fn(&[f64]) -> T,
) -> Result<Option<LayerData<T>>, FbxError> {
    let Some(layer_handle) = layer_names
        .iter()
        .find_map(|name| nodes.find(geom_handle, name).ok())
    else {
        return Ok(None);
    };

    let mapping_node = nodes.get_by_name(layer_handle, "MappingInformationType")?;
    let mapping = string_to_mapping(&mapping_node.get_attrib(0)?.as_string());
    if !matches!(mapping, FbxMapping::ByPolygonVertex | FbxMapping::ByVertex) {
        log::warn!("skipping attribute layer with unsupported mapping {mapping:?}");
        return Ok(None);
    }

    let reference_node = nodes.get_by_name(layer_handle, "ReferenceInformationType")?;
    let reference = string_to_reference(&reference_node.get_attrib(0)?.as_string());
    let indices = match reference {
        FbxReference::Direct => Vec::new(),
        FbxReference::IndexToDirect => {
            match index_names
                .iter()
                .find_map(|name| read_i32_array(nodes, layer_handle, name).ok())
            {
                Some(indices) => indices,
                None => Vec::new(),
            }
        }
        FbxReference::Unknown => {
            log::warn!("skipping attribute layer with unsupported reference mode");
            return Ok(None);
        }
    };

    let Some(data_name) = data_names
        .iter()
        .find(|name| nodes.find(layer_handle, name).is_ok())
    else {
        return Ok(None);
    };
    let raw = read_f64_array(nodes, layer_handle, data_name)?;
    let elements = raw.chunks_exact(stride).map(make).collect();

    Ok(Some(LayerData {
        elements,
        indices,
        mapping,
    }))
}

impl FbxGeometry {
    pub(crate) fn read(
        base: FbxObject,
        geom_handle: Handle<FbxNode>,
        nodes: &FbxNodeContainer,
    ) -> Result<Self, FbxError> {
        let raw_points = read_f64_array(nodes, geom_handle, "Vertices")
            .map_err(|_| String::from("Vertices missing"))?;
        let mut control_points = Vec::with_capacity(raw_points.len() / 3);
        for chunk in raw_points.chunks_exact(3) {
            control_points.push(Vector3::new(chunk[0], chunk[1], chunk[2]));
        }

        let original_indices = read_i32_array(nodes, geom_handle, "PolygonVertexIndex")
            .map_err(|_| String::from("Indices missing"))?;

        let (to_old_vertices, to_old_indices) = triangulate(&original_indices);

        let mut vertices = Vec::with_capacity(to_old_vertices.len());
        for &old in to_old_vertices.iter() {
            vertices.push(
                control_points
                    .get(old as usize)
                    .copied()
                    .ok_or(FbxError::IndexOutOfBounds)?,
            );
        }

        // Some control points can be unused, so this is indexed by the
        // original vertex count rather than the corner count.
        let mut to_new_vertices = vec![Vec::new(); control_points.len()];
        for (new, &old) in to_old_vertices.iter().enumerate() {
            to_new_vertices[old as usize].push(new as i32);
        }

        let mut geom = FbxGeometry {
            base,
            vertices,
            to_old_vertices,
            to_new_vertices,
            normals: None,
            uvs: None,
            colors: None,
            tangents: None,
            materials: None,
            skin: Handle::NONE,
        };

        geom.read_materials(geom_handle, nodes, &original_indices)?;

        if let Some(layer) = read_layer(
            nodes,
            geom_handle,
            &["LayerElementNormal"],
            &["Normals"],
            &["NormalsIndex", "NormalIndex"],
            3,
            |c| Vector3::new(c[0], c[1], c[2]),
        )? {
            let mut out = splat(layer.mapping, &layer.elements, &layer.indices, &original_indices);
            remap(&mut out, &to_old_indices);
            geom.normals = Some(out);
        }

        if let Some(layer) = read_layer(
            nodes,
            geom_handle,
            &["LayerElementUV"],
            &["UV"],
            &["UVIndex"],
            2,
            |c| Vector2::new(c[0], c[1]),
        )? {
            let mut out = splat(layer.mapping, &layer.elements, &layer.indices, &original_indices);
            remap(&mut out, &to_old_indices);
            geom.uvs = Some(out);
        }

        if let Some(layer) = read_layer(
            nodes,
            geom_handle,
            &["LayerElementColor"],
            &["Colors"],
            &["ColorIndex", "ColorsIndex"],
            4,
            |c| Vector4::new(c[0], c[1], c[2], c[3]),
        )? {
            let mut out = splat(layer.mapping, &layer.elements, &layer.indices, &original_indices);
            remap(&mut out, &to_old_indices);
            geom.colors = Some(out);
        }

        if let Some(layer) = read_layer(
            nodes,
            geom_handle,
            &["LayerElementTangents", "LayerElementTangent"],
            &["Tangents", "Tangent"],
            &["TangentsIndex", "TangentIndex"],
            3,
            |c| Vector3::new(c[0], c[1], c[2]),
        )? {
            let mut out = splat(layer.mapping, &layer.elements, &layer.indices, &original_indices);
            remap(&mut out, &to_old_indices);
            geom.tangents = Some(out);
        }

        Ok(geom)
    }

    fn read_materials(
        &mut self,
        geom_handle: Handle<FbxNode>,
        nodes: &FbxNodeContainer,
        original_indices: &[i32],
    ) -> Result<(), FbxError> {
        let Ok(layer_handle) = nodes.find(geom_handle, "LayerElementMaterial") else {
            return Ok(());
        };

        let mapping_node = nodes.get_by_name(layer_handle, "MappingInformationType")?;
        let mapping = mapping_node.get_attrib(0)?.as_string();
        let reference_node = nodes.get_by_name(layer_handle, "ReferenceInformationType")?;
        let reference = reference_node.get_attrib(0)?.as_string();

        if mapping == "ByPolygon" && reference == "IndexToDirect" {
            let per_poly = read_i32_array(nodes, layer_handle, "Materials")
                .map_err(|_| String::from("Invalid LayerElementMaterial"))?;

            let mut materials = Vec::with_capacity(self.vertices.len() / 3);
            let mut idx = 0usize;
            for &material in per_poly.iter() {
                let tri_count = get_tri_count_from_poly(original_indices, &mut idx);
                for _ in 0..tri_count {
                    materials.push(material);
                }
            }
            self.materials = Some(materials);
        } else if mapping != "AllSame" {
            return Err(FbxError::InvalidMapping);
        }

        Ok(())
    }

    /// Number of triangles after fanning.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::FbxDocument;

    #[test]
    fn single_triangle_is_identity() {
        let (to_old_vertices, to_old_indices) = triangulate(&[0, 1, -3]);
        assert_eq!(to_old_vertices, vec![0, 1, 2]);
        assert_eq!(to_old_indices, vec![0, 1, 2]);
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let (to_old_vertices, to_old_indices) = triangulate(&[0, 1, 2, -4]);
        assert_eq!(to_old_vertices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(to_old_indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn pentagon_fans_into_three_triangles() {
        let (to_old_vertices, _) = triangulate(&[4, 5, 6, 7, -9]);
        assert_eq!(to_old_vertices, vec![4, 5, 6, 4, 6, 7, 4, 7, 8]);
    }

    #[test]
    fn triangulation_is_idempotent() {
        let first = triangulate(&[0, 1, 2, -4]);
        let already_triangulated: Vec<i32> = first
            .0
            .chunks(3)
            .flat_map(|tri| [tri[0], tri[1], !tri[2]])
            .collect();
        let second = triangulate(&already_triangulated);
        assert_eq!(second.0, first.0);
    }

    #[test]
    fn splat_with_out_of_range_index_zero_fills() {
        let data = [1.0f64, 2.0];
        let out = splat(FbxMapping::ByPolygonVertex, &data, &[0, 1, 9], &[]);
        assert_eq!(out, vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn splat_by_vertex_folds_negative_indices() {
        let data = [10.0f64, 20.0, 30.0];
        let out = splat(FbxMapping::ByVertex, &data, &[], &[0, 1, -3]);
        assert_eq!(out, vec![10.0, 20.0, 30.0]);
    }

    fn quad_geometry_text() -> String {
        "Geometry: 100, \"Geometry::quad\", \"Mesh\" {\n\
         \tVertices: *12 {\n\
         \t\ta: 0,0,0,1,0,0,1,1,0,0,1,0\n\
         \t}\n\
         \tPolygonVertexIndex: *4 {\n\
         \t\ta: 0,1,2,-4\n\
         \t}\n\
         \tLayerElementUV: 0 {\n\
         \t\tMappingInformationType: \"ByPolygonVertex\"\n\
         \t\tReferenceInformationType: \"IndexToDirect\"\n\
         \t\tUV: *8 {\n\
         \t\t\ta: 0,0,1,0,1,1,0,1\n\
         \t\t}\n\
         \t\tUVIndex: *4 {\n\
         \t\t\ta: 0,1,2,3\n\
         \t\t}\n\
         \t}\n\
         \tLayerElementMaterial: 0 {\n\
         \t\tMappingInformationType: \"ByPolygon\"\n\
         \t\tReferenceInformationType: \"IndexToDirect\"\n\
         \t\tMaterials: *1 {\n\
         \t\t\ta: 2\n\
         \t\t}\n\
         \t}\n\
         }\n"
            .to_string()
    }

    #[test]
    fn quad_geometry_end_to_end() {
        let doc = FbxDocument::from_memory(quad_geometry_text().as_bytes()).unwrap();
        let geom_handle = doc.nodes().find(doc.root(), "Geometry").unwrap();
        let geom =
            FbxGeometry::read(FbxObject::unattached("quad"), geom_handle, doc.nodes()).unwrap();

        assert_eq!(geom.to_old_vertices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(geom.vertices.len(), 6);
        assert_eq!(geom.triangle_count(), 2);
        assert_eq!(geom.vertices[3], Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(geom.vertices[5], Vector3::new(0.0, 1.0, 0.0));

        // UV layer splats to one entry per corner.
        let uvs = geom.uvs.as_ref().unwrap();
        assert_eq!(uvs.len(), 6);
        assert_eq!(uvs[4], Vector2::new(1.0, 1.0));
        assert_eq!(uvs[5], Vector2::new(0.0, 1.0));

        // ByPolygon materials broadcast per triangle.
        assert_eq!(geom.materials.as_ref().unwrap(), &vec![2, 2]);

        // Corner multimap: control point 0 produced corners 0 and 3.
        assert_eq!(geom.to_new_vertices[0], vec![0, 3]);
        assert_eq!(geom.to_new_vertices[2], vec![2, 4]);
    }
}
