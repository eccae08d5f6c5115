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

//! FBX decoder and scene assembler.
//!
//! FBX is Autodesk's interchange format for 3D scenes: meshes, skeletons,
//! skinning clusters, materials, textures, cameras, lights, constraints and
//! layered keyframe animation, stored in either a binary or an ASCII
//! dialect. This crate tokenizes both dialects into one generic document
//! tree, instantiates strongly typed scene components from it, resolves the
//! document's flat connection table into an object graph, post-processes
//! geometry and skinning data, and evaluates time-sampled transforms on
//! demand.
//!
//! ```no_run
//! let bytes = std::fs::read("scene.fbx").unwrap();
//! let scene = fbx_scene::load(&bytes).unwrap();
//! for &handle in scene.all_objects() {
//!     println!("{}", scene.get(handle).base().name);
//! }
//! ```

pub mod document;
pub mod error;
pub mod pool;
pub mod scene;

pub use crate::{
    document::FbxDocument,
    error::FbxError,
    pool::Handle,
    scene::{
        FbxComponent, FbxComponentKind, FbxEvaluationInfo, FbxScene, FbxTime,
        FbxTransformComponent, FBX_TICKS_PER_SECOND,
    },
};

/// Parses a byte buffer holding either dialect of FBX and assembles the
/// scene. On failure nothing partial escapes; the error describes the first
/// fatal problem encountered.
pub fn load(data: &[u8]) -> Result<FbxScene, FbxError> {
    let document = FbxDocument::from_memory(data)?;
    FbxScene::new(document)
}
