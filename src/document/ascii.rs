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

//! ASCII FBX tokenizer. Line oriented: `;` starts a comment, quoted strings
//! keep embedded whitespace, `Name: v1, v2 { ... }` opens a scope. Array
//! blocks (`Vertices: *24 { a: ... }`) parse into the same `a` child node
//! shape the binary tokenizer produces; the `*24` size header is dropped.

use crate::{
    document::{attribute::FbxAttribute, FbxDocument, FbxNode, FbxNodeContainer},
    error::FbxError,
    pool::{Handle, Pool},
};
use byteorder::ReadBytesExt;
use std::io::{Read, Seek, SeekFrom};

pub fn read_ascii<R>(reader: &mut R) -> Result<FbxDocument, FbxError>
where
    R: Read + Seek,
{
    let mut nodes: Pool<FbxNode> = Pool::new();
    let root_handle = nodes.spawn(FbxNode {
        name: String::from("__ROOT__"),
        children: Vec::new(),
        parent: Handle::NONE,
        attributes: Vec::new(),
    });
    let mut parent_handle: Handle<FbxNode> = root_handle;
    let mut node_handle: Handle<FbxNode> = Handle::NONE;
    let mut buffer: Vec<u8> = Vec::new();
    let mut name: Vec<u8> = Vec::new();
    let mut value: Vec<u8> = Vec::new();

    let buf_len = reader.seek(SeekFrom::End(0))?;
    reader.rewind()?;

    // Read line by line
    while reader.stream_position()? < buf_len {
        // Read line, trim spaces (but leave spaces in quotes)
        buffer.clear();

        let mut read_all = false;
        while reader.stream_position()? < buf_len {
            let symbol = reader.read_u8()?;
            if symbol == b'\n' {
                break;
            } else if symbol == b'"' {
                read_all = !read_all;
            } else if read_all || !symbol.is_ascii_whitespace() {
                buffer.push(symbol);
            }
        }

        // Ignore comments and empty lines
        if buffer.is_empty() || buffer[0] == b';' {
            continue;
        }

        // Parse string
        let mut read_value = false;
        name.clear();
        for (i, symbol) in buffer.iter().enumerate() {
            let symbol = *symbol;
            if i == 0 && (symbol == b'-' || symbol.is_ascii_digit()) {
                // Continuation of a multi-line value list.
                read_value = true;
            }
            if symbol == b':' && !read_value {
                read_value = true;
                let name_copy = String::from_utf8(name.clone())?;
                let node = FbxNode {
                    name: name_copy,
                    attributes: Vec::new(),
                    parent: parent_handle,
                    children: Vec::new(),
                };
                node_handle = nodes.spawn(node);
                name.clear();
                let parent = nodes.borrow_mut(parent_handle);
                parent.children.push(node_handle);
            } else if symbol == b'{' {
                // Enter child scope
                parent_handle = node_handle;
                // Commit attribute if we have one; array size headers
                // (`*24`) are dropped since the `a` child carries the data.
                if !value.is_empty() {
                    if value[0] != b'*' {
                        let node = nodes.borrow_mut(node_handle);
                        let string_value = String::from_utf8(value.clone())?;
                        node.attributes.push(FbxAttribute::String(string_value));
                    }
                    value.clear();
                }
            } else if symbol == b'}' {
                // Exit child scope
                let parent = nodes.borrow_mut(parent_handle);
                parent_handle = parent.parent;
            } else if symbol == b',' || (i == buffer.len() - 1) {
                // Commit attribute
                if symbol != b',' {
                    value.push(symbol);
                }
                if node_handle.is_some() {
                    let node = nodes.borrow_mut(node_handle);
                    let string_value = String::from_utf8(value.clone())?;
                    node.attributes.push(FbxAttribute::String(string_value));
                }
                value.clear();
            } else if !read_value {
                name.push(symbol);
            } else {
                value.push(symbol);
            }
        }
    }

    Ok(FbxDocument {
        nodes: FbxNodeContainer { nodes },
        root: root_handle,
        version: 0,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> FbxDocument {
        read_ascii(&mut Cursor::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn nested_scopes_and_attributes() {
        let doc = parse(
            "; comment line\n\
             Objects: {\n\
             \tModel: 100, \"Model::cube\", \"Mesh\" {\n\
             \t\tVersion: 232\n\
             \t}\n\
             }\n",
        );
        let objects = doc.nodes().find(doc.root(), "Objects").unwrap();
        let model = doc.nodes().get_by_name(objects, "Model").unwrap();
        assert_eq!(model.get_attrib(0).unwrap().as_i64().unwrap(), 100);
        assert_eq!(model.get_attrib(1).unwrap().as_string(), "Model::cube");
        assert_eq!(model.get_attrib(2).unwrap().as_string(), "Mesh");
        let version = doc.nodes().get_by_name(doc.root(), "Version").unwrap();
        assert_eq!(version.get_attrib(0).unwrap().as_i32().unwrap(), 232);
    }

    #[test]
    fn array_block_spanning_lines() {
        let doc = parse(
            "Vertices: *9 {\n\
             \ta: 0,0,0,1,0,0,\n\
             0,1,0\n\
             }\n",
        );
        let vertices = doc.nodes().find(doc.root(), "Vertices").unwrap();
        // Size header is not kept as an attribute.
        assert_eq!(doc.nodes().get(vertices).attrib_count(), 0);
        let a = doc.nodes().get_by_name(vertices, "a").unwrap();
        assert_eq!(a.attrib_count(), 9);
        assert_eq!(a.get_attrib(3).unwrap().as_f64().unwrap(), 1.0);
    }

    #[test]
    fn quoted_strings_keep_spaces() {
        let doc = parse("Creator: \"FBX SDK/FBX Plugins version 2019.0\"\n");
        let creator = doc.nodes().find(doc.root(), "Creator").unwrap();
        assert_eq!(
            doc.nodes().get(creator).get_attrib(0).unwrap().as_string(),
            "FBX SDK/FBX Plugins version 2019.0"
        );
    }

    #[test]
    fn negative_and_exponent_numbers() {
        let doc = parse("P: \"FieldOfView\", \"double\", \"Number\", \"A\", -1.5e-005\n");
        let p = doc.nodes().find(doc.root(), "P").unwrap();
        let val = doc.nodes().get(p).get_attrib(4).unwrap().as_f64().unwrap();
        assert!((val - (-1.5e-5)).abs() < 1e-12);
    }
}
