use kurbo::{Affine, Vec2};

/// One entry of an actor's flat component list.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
	/// Position in the owning actor's component list.
	pub index: usize,
	/// Display name.
	pub name: String,
	/// Parent index as stored; may point nowhere (root sentinel `0xFFFF`).
	pub parent_index: u16,
	/// Resolved parent position, filled by the hierarchy pass.
	pub parent: Option<usize>,
	/// Kind-specific payload.
	pub kind: ComponentKind,
}

impl Component {
	/// Parent index value used by producers for parentless components.
	pub const NO_PARENT: u16 = u16::MAX;

	/// Create an unresolved component; `index` is assigned when pushed into an actor.
	pub fn new(name: impl Into<String>, parent_index: u16, kind: ComponentKind) -> Self {
		Self {
			index: 0,
			name: name.into(),
			parent_index,
			parent: None,
			kind,
		}
	}

	/// Shared transform fields, for node-shaped kinds.
	pub fn node(&self) -> Option<&Node> {
		match &self.kind {
			ComponentKind::Node(node) | ComponentKind::RootBone(node) => Some(node),
			ComponentKind::Bone(bone) => Some(&bone.node),
			ComponentKind::JellyBone(bone) => Some(&bone.node),
			ComponentKind::IkTarget(target) => Some(&target.node),
			ComponentKind::Image(image) => Some(&image.node),
			ComponentKind::Collider(collider) => Some(&collider.node),
			ComponentKind::NodeSolo(solo) => Some(&solo.node),
			ComponentKind::NestedActorNode(nested) => Some(&nested.node),
			ComponentKind::Event | ComponentKind::CustomProperty(_) | ComponentKind::Constraint(_) => None,
		}
	}

	/// Mutable shared transform fields, for node-shaped kinds.
	pub fn node_mut(&mut self) -> Option<&mut Node> {
		match &mut self.kind {
			ComponentKind::Node(node) | ComponentKind::RootBone(node) => Some(node),
			ComponentKind::Bone(bone) => Some(&mut bone.node),
			ComponentKind::JellyBone(bone) => Some(&mut bone.node),
			ComponentKind::IkTarget(target) => Some(&mut target.node),
			ComponentKind::Image(image) => Some(&mut image.node),
			ComponentKind::Collider(collider) => Some(&mut collider.node),
			ComponentKind::NodeSolo(solo) => Some(&mut solo.node),
			ComponentKind::NestedActorNode(nested) => Some(&mut nested.node),
			ComponentKind::Event | ComponentKind::CustomProperty(_) | ComponentKind::Constraint(_) => None,
		}
	}

	/// Return `true` for timeline events.
	pub fn is_event(&self) -> bool {
		matches!(self.kind, ComponentKind::Event)
	}

	/// Image payload, when this is an image.
	pub fn image(&self) -> Option<&Image> {
		match &self.kind {
			ComponentKind::Image(image) => Some(image),
			_ => None,
		}
	}
}

/// Closed set of component kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
	/// Plain transform node.
	Node(Node),
	/// Skeletal bone.
	Bone(Bone),
	/// Skeleton root; node fields only.
	RootBone(Node),
	/// Flexible bone extension attached to a bone.
	JellyBone(JellyBone),
	/// Inverse-kinematics target.
	IkTarget(IkTarget),
	/// Textured mesh.
	Image(Image),
	/// Collision shape.
	Collider(Collider),
	/// Node showing one child at a time.
	NodeSolo(NodeSolo),
	/// Instance of a nested actor asset.
	NestedActorNode(NestedActorNode),
	/// Timeline event; base fields only.
	Event,
	/// Typed user property.
	CustomProperty(CustomValue),
	/// Constraint attached to its parent node.
	Constraint(Constraint),
}

impl ComponentKind {
	/// Stable snake-case label.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Node(_) => "node",
			Self::Bone(_) => "bone",
			Self::RootBone(_) => "root_bone",
			Self::JellyBone(_) => "jelly_bone",
			Self::IkTarget(_) => "ik_target",
			Self::Image(_) => "image",
			Self::Collider(collider) => match collider.shape {
				ColliderShape::Rectangle { .. } => "collider_rectangle",
				ColliderShape::Triangle { .. } => "collider_triangle",
				ColliderShape::Circle { .. } => "collider_circle",
				ColliderShape::Polygon { .. } => "collider_polygon",
				ColliderShape::Line { .. } => "collider_line",
			},
			Self::NodeSolo(_) => "node_solo",
			Self::NestedActorNode(_) => "nested_actor_node",
			Self::Event => "event",
			Self::CustomProperty(_) => "custom_property",
			Self::Constraint(_) => "constraint",
		}
	}
}

/// Transform fields shared by node-shaped components.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
	/// Local translation.
	pub translation: Vec2,
	/// Local rotation in radians.
	pub rotation: f64,
	/// Local scale.
	pub scale: Vec2,
	/// Local opacity.
	pub opacity: f32,
	/// Collapsed-visibility flag (data version 13 and later).
	pub collapsed_visibility: bool,
	/// Node-shaped children, filled by the hierarchy pass.
	pub children: Vec<usize>,
	/// Constraints attached to this node, filled by the hierarchy pass.
	pub constraints: Vec<usize>,
}

impl Default for Node {
	fn default() -> Self {
		Self {
			translation: Vec2::ZERO,
			rotation: 0.0,
			scale: Vec2::new(1.0, 1.0),
			opacity: 1.0,
			collapsed_visibility: false,
			children: Vec::new(),
			constraints: Vec::new(),
		}
	}
}

/// Skeletal bone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bone {
	/// Node fields.
	pub node: Node,
	/// Bone length along local x.
	pub length: f32,
	/// Jelly bones attached to this bone, filled by the hierarchy pass.
	pub jelly_bones: Vec<usize>,
}

/// Flexible extension attached to a parent bone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JellyBone {
	/// Node fields.
	pub node: Node,
	/// Extension length.
	pub length: f32,
	/// Whether the jelly bone deforms an image.
	pub connected_to_image: bool,
}

/// Constraint record; evaluation belongs to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
	/// Whether the constraint applies.
	pub enabled: bool,
	/// Blend strength in `0..=1`.
	pub strength: f32,
}

impl Default for Constraint {
	fn default() -> Self {
		Self {
			enabled: true,
			strength: 1.0,
		}
	}
}

/// Inverse-kinematics target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IkTarget {
	/// Node fields.
	pub node: Node,
	/// Solve order among targets.
	pub order: u16,
	/// Influence strength.
	pub strength: f32,
	/// Flip the solved bend direction.
	pub invert_direction: bool,
	/// Component indices of influenced bones.
	pub influenced_bones: Vec<u16>,
}

/// Textured mesh node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Image {
	/// Node fields.
	pub node: Node,
	/// Visibility flag; invisible images carry no mesh.
	pub is_visible: bool,
	/// Mesh payload, present for visible images.
	pub mesh: Option<ImageMesh>,
	/// Set when an animation keys vertex deformation on this image.
	pub has_vertex_deform_animation: bool,
}

impl Image {
	/// Number of mesh vertices, zero for invisible images.
	pub fn vertex_count(&self) -> usize {
		self.mesh.as_ref().map_or(0, |mesh| mesh.vertex_count)
	}
}

/// Mesh data of a visible image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageMesh {
	/// Blend mode byte.
	pub blend_mode: u8,
	/// Draw order.
	pub draw_order: u16,
	/// Atlas the texture coordinates refer to.
	pub atlas_index: u8,
	/// Skinning bindings; empty for rigid images.
	pub bone_bindings: Vec<BoneBinding>,
	/// World transform override, present iff bone bindings exist.
	pub override_world: Option<Affine>,
	/// Number of vertices.
	pub vertex_count: usize,
	/// Floats per vertex: 4 rigid, 12 skinned.
	pub vertex_stride: usize,
	/// Interleaved vertex floats, `vertex_count * vertex_stride` long.
	pub vertices: Vec<f32>,
	/// Triangle vertex indices, three per triangle.
	pub triangles: Vec<u16>,
}

impl ImageMesh {
	/// Vertex stride for rigid meshes (position, uv).
	pub const RIGID_STRIDE: usize = 4;
	/// Vertex stride for skinned meshes (position, uv, bone indices, weights).
	pub const SKINNED_STRIDE: usize = 12;
}

/// Binding between an image and one deforming bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneBinding {
	/// Component index of the bone.
	pub bone_index: u16,
	/// Bind-pose transform.
	pub bind: Affine,
	/// Inverse of `bind`; `None` when the bind transform is singular.
	pub inverse_bind: Option<Affine>,
}

impl BoneBinding {
	/// Pair a bind transform with its computed inverse.
	pub fn new(bone_index: u16, bind: Affine) -> Self {
		let inverse_bind = if bind.determinant() == 0.0 { None } else { Some(bind.inverse()) };
		Self {
			bone_index,
			bind,
			inverse_bind,
		}
	}
}

/// Collision shape node.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
	/// Node fields.
	pub node: Node,
	/// Whether collisions are enabled.
	pub collision_enabled: bool,
	/// Shape parameters.
	pub shape: ColliderShape,
}

/// Shape parameters per collider kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
	/// Axis-aligned rectangle.
	Rectangle {
		/// Width.
		width: f32,
		/// Height.
		height: f32,
	},
	/// Isosceles triangle.
	Triangle {
		/// Base width.
		width: f32,
		/// Height.
		height: f32,
	},
	/// Circle.
	Circle {
		/// Radius.
		radius: f32,
	},
	/// Closed polygon; interleaved x/y.
	Polygon {
		/// Contour coordinates.
		contour: Vec<f32>,
	},
	/// Open polyline; interleaved x/y.
	Line {
		/// Vertex coordinates.
		vertices: Vec<f32>,
	},
}

/// Node showing one of its children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeSolo {
	/// Node fields.
	pub node: Node,
	/// Active child slot, stored as a float so it can be keyed.
	pub active_child_index: f32,
}

/// Instance of a nested actor asset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedActorNode {
	/// Node fields.
	pub node: Node,
	/// Visibility flag; invisible instances carry no draw data.
	pub is_visible: bool,
	/// Draw order.
	pub draw_order: u16,
	/// Asset index as stored.
	pub asset_index: Option<u16>,
	/// Resolved position in the actor's nested asset table.
	pub asset: Option<usize>,
}

/// Custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomValue {
	/// Integer property.
	Integer(i32),
	/// Float property.
	Float(f32),
	/// String property.
	String(String),
	/// Boolean property.
	Boolean(bool),
}
