use image::RgbaImage;
use kurbo::Vec2;

use crate::nima::hierarchy::resolve_hierarchy;
use crate::nima::{Animation, Component, DataVersion, NimaError};

/// Decoded document: a flat component list plus animations and assets.
#[derive(Debug)]
pub struct Actor {
	/// Data version that selected every field layout.
	pub data_version: DataVersion,
	/// Flat component list; empty slots keep producer indices aligned.
	pub components: Vec<Option<Component>>,
	/// Animation clips in stream order.
	pub animations: Vec<Animation>,
	/// Texture atlases in stream order.
	pub atlases: Vec<Atlas>,
	/// Nested actor asset table.
	pub nested_assets: Vec<NestedActorAsset>,
	/// Authoring view bounds, when stored.
	pub view: Option<ViewBounds>,
	/// Most recent recoverable decode failure.
	pub error: Option<NimaError>,
	resolved_components: usize,
}

impl Actor {
	/// Create an empty actor for the given data version.
	pub fn new(data_version: DataVersion) -> Self {
		Self {
			data_version,
			components: Vec::new(),
			animations: Vec::new(),
			atlases: Vec::new(),
			nested_assets: Vec::new(),
			view: None,
			error: None,
			resolved_components: 0,
		}
	}

	/// Append a component (or an empty slot), assigning its index.
	pub fn push_component(&mut self, component: Option<Component>) -> usize {
		let index = self.components.len();
		self.components.push(component.map(|mut item| {
			item.index = index;
			item
		}));
		index
	}

	/// Look up a component by index; empty slots and out-of-range indices yield `None`.
	pub fn component(&self, index: usize) -> Option<&Component> {
		self.components.get(index)?.as_ref()
	}

	/// Mutable component lookup.
	pub fn component_mut(&mut self, index: usize) -> Option<&mut Component> {
		self.components.get_mut(index)?.as_mut()
	}

	/// Iterate present components.
	pub fn iter_components(&self) -> impl Iterator<Item = &Component> {
		self.components.iter().flatten()
	}

	/// Resolve parents and side-lists for components pushed since the previous call.
	///
	/// Already resolved components are never revisited.
	pub fn resolve_hierarchy(&mut self) {
		let start = self.resolved_components;
		if start >= self.components.len() {
			return;
		}
		resolve_hierarchy(&mut self.components, start);
		self.resolved_components = self.components.len();
	}

	/// Return `true` when every pushed component has been through the hierarchy pass.
	pub fn is_hierarchy_resolved(&self) -> bool {
		self.resolved_components == self.components.len()
	}

	/// Find an animation by name.
	pub fn animation(&self, name: &str) -> Option<&Animation> {
		self.animations.iter().find(|item| item.name == name)
	}

	/// Record a recoverable failure, replacing any earlier one.
	pub(crate) fn record_error(&mut self, err: NimaError) {
		tracing::warn!(error = %err, "recoverable decode failure");
		self.error = Some(err);
	}
}

/// Authoring view rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
	/// View center.
	pub center: Vec2,
	/// View width.
	pub width: f32,
	/// View height.
	pub height: f32,
}

/// Texture atlas stored as separate color and alpha images.
#[derive(Debug, Clone, PartialEq)]
pub struct Atlas {
	/// Compressed color image bytes.
	pub color: Vec<u8>,
	/// Compressed alpha image bytes.
	pub alpha: Vec<u8>,
	/// Composited image, set once resolution completes.
	pub image: Option<RgbaImage>,
}

impl Atlas {
	/// Create an unresolved atlas.
	pub fn new(color: Vec<u8>, alpha: Vec<u8>) -> Self {
		Self { color, alpha, image: None }
	}
}

/// Sub-document referenced by nested actor nodes.
#[derive(Debug)]
pub struct NestedActorAsset {
	/// Asset id.
	pub id: String,
	/// Producer-relative path.
	pub path: String,
	/// Loaded sub-document, once resolved.
	pub actor: Option<Box<Actor>>,
}

impl NestedActorAsset {
	/// Create an unresolved asset record.
	pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			path: path.into(),
			actor: None,
		}
	}
}
