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
    document::{FbxNode, FbxNodeContainer},
    error::FbxError,
    pool::Handle,
    scene::FbxObject,
};

pub struct FbxTexture {
    pub base: FbxObject,
    filename: String,
    relative_filename: String,
}

impl FbxTexture {
    pub(crate) fn read(
        base: FbxObject,
        texture_handle: Handle<FbxNode>,
        nodes: &FbxNodeContainer,
    ) -> Result<Self, FbxError> {
        let mut texture = FbxTexture {
            base,
            filename: String::new(),
            relative_filename: String::new(),
        };
        if let Ok(filename_node) = nodes.get_by_name(texture_handle, "FileName") {
            if let Ok(attrib) = filename_node.get_attrib(0) {
                texture.filename = fix_path(&attrib.as_string());
            }
        }
        if let Ok(relative_node) = nodes.get_by_name(texture_handle, "RelativeFilename") {
            if let Ok(attrib) = relative_node.get_attrib(0) {
                texture.relative_filename = fix_path(&attrib.as_string());
            }
        }
        Ok(texture)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn relative_filename(&self) -> &str {
        &self.relative_filename
    }
}

/// Most FBX files come from Windows tooling and carry double backslashes
/// that have to be fixed up before the path is usable elsewhere.
fn fix_path(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::FbxDocument;

    #[test]
    fn reads_and_fixes_paths() {
        let text = "Texture: 7, \"Texture::diffuse\", \"\" {\n\
             \tFileName: \"C:\\textures\\wood.png\"\n\
             \tRelativeFilename: \"textures\\wood.png\"\n\
             }\n";
        let doc = FbxDocument::from_memory(text.as_bytes()).unwrap();
        let handle = doc.nodes().find(doc.root(), "Texture").unwrap();
        let texture =
            FbxTexture::read(FbxObject::unattached("diffuse"), handle, doc.nodes()).unwrap();
        assert_eq!(texture.filename(), "C:/textures/wood.png");
        assert_eq!(texture.relative_filename(), "textures/wood.png");
    }
}
