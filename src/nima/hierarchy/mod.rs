use crate::nima::{Component, ComponentKind};

/// Parent-owned list a resolved component registers into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideList {
	Children,
	Constraints,
	JellyBones,
}

/// Resolve `parent` for every slot from `start` on and fill parent-owned side-lists.
///
/// Parents may sit anywhere in `components`, including before `start`. Self references, empty
/// slots, and out-of-range indices (including the root sentinel) leave the component parentless.
pub(crate) fn resolve_hierarchy(components: &mut [Option<Component>], start: usize) {
	let mut links = Vec::new();
	for (index, slot) in components.iter().enumerate().skip(start) {
		let Some(child) = slot else {
			continue;
		};
		if child.parent.is_some() {
			continue;
		}

		let parent_index = usize::from(child.parent_index);
		if parent_index == index {
			continue;
		}
		let Some(Some(parent)) = components.get(parent_index) else {
			continue;
		};

		links.push((index, parent_index, None));
		let parent_is_node = parent.node().is_some();
		if parent_is_node && child.node().is_some() {
			links.push((index, parent_index, Some(SideList::Children)));
		}
		match (&child.kind, &parent.kind) {
			(ComponentKind::Constraint(_), _) if parent_is_node => {
				links.push((index, parent_index, Some(SideList::Constraints)));
			}
			(ComponentKind::JellyBone(_), ComponentKind::Bone(_)) => {
				links.push((index, parent_index, Some(SideList::JellyBones)));
			}
			_ => {}
		}
	}

	for (index, parent_index, list) in links {
		match list {
			None => {
				if let Some(Some(child)) = components.get_mut(index) {
					child.parent = Some(parent_index);
				}
			}
			Some(list) => register(components, parent_index, index, list),
		}
	}
}

fn register(components: &mut [Option<Component>], parent_index: usize, index: usize, list: SideList) {
	let Some(Some(parent)) = components.get_mut(parent_index) else {
		return;
	};
	match list {
		SideList::Children => {
			if let Some(node) = parent.node_mut() {
				node.children.push(index);
			}
		}
		SideList::Constraints => {
			if let Some(node) = parent.node_mut() {
				node.constraints.push(index);
			}
		}
		SideList::JellyBones => {
			if let ComponentKind::Bone(bone) = &mut parent.kind {
				bone.jelly_bones.push(index);
			}
		}
	}
}
