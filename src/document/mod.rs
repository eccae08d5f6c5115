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

//! Generic FBX document tree. Both the binary and the ASCII dialect are
//! tokenized into the same [`FbxNode`] shape, so everything downstream is
//! dialect-agnostic. Typed array payloads surface as a synthetic child node
//! named `a` holding the decoded attributes.

mod ascii;
pub mod attribute;
mod binary;

use crate::{
    document::attribute::FbxAttribute,
    error::FbxError,
    pool::{Handle, Pool},
};
use nalgebra::{Vector2, Vector3};
use std::io::Cursor;

pub struct FbxNode {
    pub(crate) name: String,
    pub(crate) attributes: Vec<FbxAttribute>,
    pub(crate) parent: Handle<FbxNode>,
    pub(crate) children: Vec<Handle<FbxNode>>,
}

impl Default for FbxNode {
    fn default() -> Self {
        Self {
            name: "".to_string(),
            attributes: Vec::new(),
            parent: Default::default(),
            children: Vec::new(),
        }
    }
}

impl FbxNode {
    pub fn get_vec3_at(&self, n: usize) -> Result<Vector3<f64>, String> {
        Ok(Vector3::new(
            self.get_attrib(n)?.as_f64()?,
            self.get_attrib(n + 1)?.as_f64()?,
            self.get_attrib(n + 2)?.as_f64()?,
        ))
    }

    pub fn get_vec2_at(&self, n: usize) -> Result<Vector2<f64>, String> {
        Ok(Vector2::new(
            self.get_attrib(n)?.as_f64()?,
            self.get_attrib(n + 1)?.as_f64()?,
        ))
    }

    pub fn get_attrib(&self, n: usize) -> Result<&FbxAttribute, String> {
        match self.attributes.get(n) {
            Some(attrib) => Ok(attrib),
            None => Err(format!(
                "Unable to get {n} attribute because index out of bounds."
            )),
        }
    }

    pub fn attrib_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[FbxAttribute] {
        &self.attributes
    }

    pub fn children(&self) -> &[Handle<FbxNode>] {
        &self.children
    }

    pub fn parent(&self) -> Handle<FbxNode> {
        self.parent
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct FbxNodeContainer {
    nodes: Pool<FbxNode>,
}

impl FbxNodeContainer {
    /// Searches a node by name in the subtree of `root` and returns its
    /// handle if found.
    pub fn find(&self, root: Handle<FbxNode>, name: &str) -> Result<Handle<FbxNode>, String> {
        let node = self.nodes.borrow(root);

        if node.name == name {
            return Ok(root);
        }

        for child_handle in node.children.iter() {
            if let Ok(result) = self.find(*child_handle, name) {
                return Ok(result);
            }
        }

        Err(format!("FBX DOM: Unable to find {name} node"))
    }

    /// Searches a node by name and borrows a reference to it.
    pub fn get_by_name(&self, root: Handle<FbxNode>, name: &str) -> Result<&'_ FbxNode, String> {
        let node = self.nodes.borrow(root);

        if node.name == name {
            return Ok(node);
        }

        for child_handle in node.children.iter() {
            if let Ok(result) = self.get_by_name(*child_handle, name) {
                return Ok(result);
            }
        }

        Err(format!("FBX DOM: Unable to find {name} node"))
    }

    pub fn get(&self, handle: Handle<FbxNode>) -> &FbxNode {
        self.nodes.borrow(handle)
    }

    pub fn try_get(&self, handle: Handle<FbxNode>) -> Option<&FbxNode> {
        self.nodes.try_borrow(handle)
    }
}

pub struct FbxDocument {
    root: Handle<FbxNode>,
    nodes: FbxNodeContainer,
    version: u32,
}

fn is_binary(data: &[u8]) -> bool {
    let fbx_magic = b"Kaydara FBX Binary";
    data.len() >= fbx_magic.len() && &data[0..fbx_magic.len()] == fbx_magic
}

impl FbxDocument {
    /// Tokenizes a document from a byte buffer. The dialect is sniffed from
    /// the binary magic; a failed binary parse retries as ASCII.
    pub fn from_memory(data: &[u8]) -> Result<FbxDocument, FbxError> {
        if is_binary(data) {
            match binary::read_binary(&mut Cursor::new(data)) {
                Ok(document) => Ok(document),
                Err(err) => {
                    log::warn!("binary FBX parse failed ({err}), retrying as ASCII");
                    ascii::read_ascii(&mut Cursor::new(data))
                }
            }
        } else {
            ascii::read_ascii(&mut Cursor::new(data))
        }
    }

    pub fn root(&self) -> Handle<FbxNode> {
        self.root
    }

    pub fn nodes(&self) -> &FbxNodeContainer {
        &self.nodes
    }

    /// Version from the binary header; zero for ASCII documents.
    pub fn version(&self) -> u32 {
        self.version
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dialect_sniff() {
        assert!(is_binary(b"Kaydara FBX Binary  \x00\x1a\x00rest"));
        assert!(!is_binary(b"; FBX 7.4.0 project file"));
        assert!(!is_binary(b"Kay"));
    }

    #[test]
    fn ascii_navigation() {
        let data = b"Objects: {\n\tGeometry: 1, \"Geometry::cube\", \"Mesh\" {\n\t}\n}\n";
        let doc = FbxDocument::from_memory(data).unwrap();
        let objects = doc.nodes().find(doc.root(), "Objects").unwrap();
        let geometry = doc.nodes().get_by_name(objects, "Geometry").unwrap();
        assert_eq!(geometry.get_attrib(0).unwrap().as_i64().unwrap(), 1);
        assert_eq!(geometry.get_attrib(2).unwrap().as_string(), "Mesh");
    }
}
