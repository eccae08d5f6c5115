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

//! Binary FBX tokenizer, following the layout described in
//! <https://code.blender.org/2013/08/fbx-binary-file-format-specification/>.
//! Files with version 7500 and newer use 64-bit record offsets and a wider
//! block sentinel.

use crate::{
    document::{attribute::FbxAttribute, FbxDocument, FbxNode, FbxNodeContainer},
    error::FbxError,
    pool::{Handle, Pool},
};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};

fn read_attrib<R>(type_code: u8, file: &mut R) -> Result<FbxAttribute, FbxError>
where
    R: Read,
{
    match type_code {
        b'f' | b'F' => Ok(FbxAttribute::Float(file.read_f32::<LittleEndian>()?)),
        b'd' | b'D' => Ok(FbxAttribute::Double(file.read_f64::<LittleEndian>()?)),
        b'l' | b'L' => Ok(FbxAttribute::Long(file.read_i64::<LittleEndian>()?)),
        b'i' | b'I' => Ok(FbxAttribute::Integer(file.read_i32::<LittleEndian>()?)),
        b'Y' => Ok(FbxAttribute::Integer(i32::from(
            file.read_i16::<LittleEndian>()?,
        ))),
        b'b' | b'c' | b'C' => Ok(FbxAttribute::Bool(file.read_u8()? != 0)),
        _ => Err(FbxError::UnknownAttributeType(type_code)),
    }
}

fn read_array<R>(type_code: u8, file: &mut R) -> Result<Vec<FbxAttribute>, FbxError>
where
    R: Read,
{
    let length = file.read_u32::<LittleEndian>()? as usize;
    let encoding = file.read_u32::<LittleEndian>()?;
    let compressed_length = file.read_u32::<LittleEndian>()? as usize;
    let mut array = Vec::with_capacity(length);

    if encoding == 0 {
        for _ in 0..length {
            array.push(read_attrib(type_code, file)?);
        }
    } else {
        let mut compressed = vec![0; compressed_length];
        file.read_exact(compressed.as_mut_slice())?;
        let decompressed = inflate::inflate_bytes_zlib(&compressed)?;
        let mut cursor = Cursor::new(decompressed);
        for _ in 0..length {
            array.push(read_attrib(type_code, &mut cursor)?);
        }
    }

    Ok(array)
}

fn read_string<R>(file: &mut R) -> Result<FbxAttribute, FbxError>
where
    R: Read,
{
    let length = file.read_u32::<LittleEndian>()? as usize;
    let mut raw_string = vec![0; length];
    file.read_exact(raw_string.as_mut_slice())?;
    // Find null terminator. Some strings carry additional data after the
    // terminator (like Omni004\x0\x1Model) while the declared length still
    // covers the whole payload.
    if let Some(null_terminator_pos) = raw_string.iter().position(|c| *c == 0) {
        raw_string.truncate(null_terminator_pos);
    }
    let string = String::from_utf8(raw_string)?;
    Ok(FbxAttribute::String(string))
}

fn read_raw<R>(file: &mut R) -> Result<FbxAttribute, FbxError>
where
    R: Read,
{
    let length = file.read_u32::<LittleEndian>()? as usize;
    let mut raw = vec![0; length];
    file.read_exact(raw.as_mut_slice())?;
    Ok(FbxAttribute::RawData(raw))
}

/// Record offsets widened from u32 to u64 in version 7500.
fn read_offset<R>(file: &mut R, version: u32) -> Result<u64, FbxError>
where
    R: Read,
{
    if version >= 7500 {
        Ok(file.read_u64::<LittleEndian>()?)
    } else {
        Ok(u64::from(file.read_u32::<LittleEndian>()?))
    }
}

fn block_sentinel_length(version: u32) -> u64 {
    if version >= 7500 {
        25
    } else {
        13
    }
}

/// In case of success returns Ok(valid_handle), in case if no more nodes
/// are present returns Ok(none_handle), in case of error returns some
/// FbxError.
fn read_binary_node<R>(
    file: &mut R,
    pool: &mut Pool<FbxNode>,
    version: u32,
) -> Result<Handle<FbxNode>, FbxError>
where
    R: Read + Seek,
{
    let end_offset = read_offset(file, version)?;
    if end_offset == 0 {
        // Footer found. We're done.
        return Ok(Handle::NONE);
    }

    let num_attrib = read_offset(file, version)? as usize;
    let _attrib_list_len = read_offset(file, version)?;

    // Read name.
    let name_len = file.read_u8()? as usize;
    let mut raw_name = vec![0; name_len];
    file.read_exact(raw_name.as_mut_slice())?;

    let node = FbxNode {
        name: String::from_utf8(raw_name)?,
        ..Default::default()
    };
    let node_handle = pool.spawn(node);

    // Read attributes. Array payloads become a child node named "a", which
    // is also the shape ASCII array blocks parse into.
    for _ in 0..num_attrib {
        let type_code = file.read_u8()?;
        match type_code {
            b'C' | b'Y' | b'I' | b'F' | b'D' | b'L' => {
                let attrib = read_attrib(type_code, file)?;
                pool.borrow_mut(node_handle).attributes.push(attrib);
            }
            b'f' | b'd' | b'l' | b'i' | b'b' | b'c' => {
                let a = FbxNode {
                    name: String::from("a"),
                    attributes: read_array(type_code, file)?,
                    parent: node_handle,
                    ..Default::default()
                };
                let a_handle = pool.spawn(a);
                pool.borrow_mut(node_handle).children.push(a_handle);
            }
            b'S' => {
                let attrib = read_string(file)?;
                pool.borrow_mut(node_handle).attributes.push(attrib);
            }
            b'R' => {
                let attrib = read_raw(file)?;
                pool.borrow_mut(node_handle).attributes.push(attrib);
            }
            _ => return Err(FbxError::UnknownAttributeType(type_code)),
        }
    }

    if file.stream_position()? < end_offset {
        let sentinel_length = block_sentinel_length(version);
        let null_record_position = end_offset.saturating_sub(sentinel_length);
        while file.stream_position()? < null_record_position {
            let child_handle = read_binary_node(file, pool, version)?;
            if child_handle.is_none() {
                return Ok(child_handle);
            }
            pool.borrow_mut(child_handle).parent = node_handle;
            pool.borrow_mut(node_handle).children.push(child_handle);
        }

        // The sentinel content is not validated, only skipped.
        file.seek(SeekFrom::Current(sentinel_length as i64))?;
    }

    Ok(node_handle)
}

pub fn read_binary<R>(file: &mut R) -> Result<FbxDocument, FbxError>
where
    R: Read + Seek,
{
    let total_length = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(0))?;

    // Magic and two reserved bytes precede the version.
    let mut temp = [0; 23];
    file.read_exact(&mut temp)?;

    let version = file.read_u32::<LittleEndian>()?;
    if version < 7100 {
        return Err(FbxError::UnsupportedVersion(version as i32));
    }

    let mut nodes = Pool::new();
    let root = FbxNode {
        name: String::from("__ROOT__"),
        ..Default::default()
    };
    let root_handle = nodes.spawn(root);

    // FBX documents can have multiple root level nodes, so we must read
    // until the terminating zero offset (or the end of the buffer).
    while file.stream_position()? < total_length {
        let root_child = read_binary_node(file, &mut nodes, version)?;
        if root_child.is_none() {
            break;
        }
        nodes.borrow_mut(root_child).parent = root_handle;
        nodes.borrow_mut(root_handle).children.push(root_child);
    }

    Ok(FbxDocument {
        root: root_handle,
        nodes: FbxNodeContainer { nodes },
        version,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Write;

    fn header(version: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"Kaydara FBX Binary  \x00\x1a\x00");
        out.write_u32::<LittleEndian>(version).unwrap();
        out
    }

    // Writes one leaf node record with the given scalar attributes.
    fn leaf_node(out: &mut Vec<u8>, name: &str, attribs: &[(u8, Vec<u8>)]) {
        let payload_len: usize = attribs.iter().map(|(_, p)| 1 + p.len()).sum();
        let end = out.len() + 13 + name.len() + payload_len;
        out.write_u32::<LittleEndian>(end as u32).unwrap();
        out.write_u32::<LittleEndian>(attribs.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(payload_len as u32).unwrap();
        out.write_u8(name.len() as u8).unwrap();
        out.write_all(name.as_bytes()).unwrap();
        for (code, payload) in attribs {
            out.write_u8(*code).unwrap();
            out.write_all(payload).unwrap();
        }
    }

    #[test]
    fn empty_document() {
        let mut data = header(7400);
        data.write_u32::<LittleEndian>(0).unwrap();
        data.extend_from_slice(&[0; 13]);

        let doc = read_binary(&mut Cursor::new(&data)).unwrap();
        assert_eq!(doc.version(), 7400);
        assert!(doc.nodes().get(doc.root()).children().is_empty());
    }

    #[test]
    fn scalar_attributes() {
        let mut data = header(7400);
        let mut long = Vec::new();
        long.write_i64::<LittleEndian>(123456).unwrap();
        let mut string = Vec::new();
        string.write_u32::<LittleEndian>(4).unwrap();
        string.extend_from_slice(b"test");
        leaf_node(&mut data, "Node", &[(b'L', long), (b'S', string)]);
        data.write_u32::<LittleEndian>(0).unwrap();
        data.extend_from_slice(&[0; 13]);

        let doc = read_binary(&mut Cursor::new(&data)).unwrap();
        let node = doc.nodes().get_by_name(doc.root(), "Node").unwrap();
        assert_eq!(node.get_attrib(0).unwrap().as_i64().unwrap(), 123456);
        assert_eq!(node.get_attrib(1).unwrap().as_string(), "test");
    }

    #[test]
    fn raw_array_property() {
        let mut data = header(7400);
        let mut payload = Vec::new();
        payload.write_u32::<LittleEndian>(3).unwrap(); // count
        payload.write_u32::<LittleEndian>(0).unwrap(); // raw encoding
        payload.write_u32::<LittleEndian>(12).unwrap();
        for v in [1i32, 2, 3] {
            payload.write_i32::<LittleEndian>(v).unwrap();
        }
        leaf_node(&mut data, "Arr", &[(b'i', payload)]);
        data.write_u32::<LittleEndian>(0).unwrap();
        data.extend_from_slice(&[0; 13]);

        let doc = read_binary(&mut Cursor::new(&data)).unwrap();
        let arr = doc.nodes().find(doc.root(), "Arr").unwrap();
        let a = doc.nodes().get_by_name(arr, "a").unwrap();
        assert_eq!(a.attrib_count(), 3);
        assert_eq!(a.get_attrib(2).unwrap().as_i32().unwrap(), 3);
    }

    #[test]
    fn deflated_array_property() {
        // zlib stream of the little-endian doubles [1.0, 2.5].
        let compressed: &[u8] = &[
            0x78, 0x9c, 0x63, 0x60, 0x00, 0x81, 0x0f, 0xf6, 0x60, 0x8a, 0x81, 0xc5, 0x01, 0x00,
            0x0b, 0xef, 0x01, 0x74,
        ];
        let mut data = header(7400);
        let mut payload = Vec::new();
        payload.write_u32::<LittleEndian>(2).unwrap();
        payload.write_u32::<LittleEndian>(1).unwrap(); // deflate encoding
        payload
            .write_u32::<LittleEndian>(compressed.len() as u32)
            .unwrap();
        payload.extend_from_slice(compressed);
        leaf_node(&mut data, "Arr", &[(b'd', payload)]);
        data.write_u32::<LittleEndian>(0).unwrap();
        data.extend_from_slice(&[0; 13]);

        let doc = read_binary(&mut Cursor::new(&data)).unwrap();
        let arr = doc.nodes().find(doc.root(), "Arr").unwrap();
        let a = doc.nodes().get_by_name(arr, "a").unwrap();
        assert_eq!(a.attrib_count(), 2);
        assert_eq!(a.get_attrib(0).unwrap().as_f64().unwrap(), 1.0);
        assert_eq!(a.get_attrib(1).unwrap().as_f64().unwrap(), 2.5);
    }

    #[test]
    fn truncated_buffer_is_io_error() {
        let mut data = header(7400);
        data.write_u32::<LittleEndian>(9999).unwrap(); // end offset beyond buffer
        data.write_u32::<LittleEndian>(1).unwrap();

        assert!(matches!(
            read_binary(&mut Cursor::new(&data)),
            Err(FbxError::Io(_))
        ));
    }

    #[test]
    fn old_versions_rejected() {
        let data = header(6100);
        assert!(matches!(
            read_binary(&mut Cursor::new(&data)),
            Err(FbxError::UnsupportedVersion(6100))
        ));
    }
}
