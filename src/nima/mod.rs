mod actor;
mod animation;
mod animation_reader;
mod assets;
mod block;
mod bytes;
mod cancel;
mod component;
mod component_reader;
mod document;
mod error;
mod header;
mod hierarchy;
mod loader;
mod version;

/// Decoded document and its asset tables.
pub use actor::{Actor, Atlas, NestedActorAsset, ViewBounds};
/// Animation clip, track, and keyframe types.
pub use animation::{AnimatedComponent, AnimatedProperty, Animation, DrawOrderEntry, Interpolation, KeyFrame, KeyFrameValue, LinkedKeyFrames, PropertyType};
/// Async collaborator interfaces and the default image service.
pub use assets::{ImageService, NestedActorLoader, RasterImageService};
/// Block container and iterator types.
pub use block::{Block, BlockIter, BlockTag};
/// Little-endian byte cursor.
pub use bytes::Cursor;
/// Cancellation signal for asset resolution.
pub use cancel::CancelToken;
/// Component model types.
pub use component::{
	Bone, BoneBinding, Collider, ColliderShape, Component, ComponentKind, Constraint, CustomValue, IkTarget, Image, ImageMesh, JellyBone, NestedActorNode, Node,
	NodeSolo,
};
/// Synchronous document decode entry point.
pub use document::decode_document;
/// Error and result aliases.
pub use error::{NimaError, Result};
/// File header representation and signature handling.
pub use header::{NimaHeader, SignaturePolicy};
/// Async loader, options, and directory-backed nested loading.
pub use loader::{ActorLoader, Completion, DirectoryNestedLoader, LoadOptions};
/// Data versions and the per-version decode layout.
pub use version::{AnimationHeader, DataVersion, DecodeLayout, InterpolationOrder, NodeLayout, PropertyFraming};
