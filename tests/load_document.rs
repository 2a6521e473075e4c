#![allow(missing_docs)]

use std::cell::{Cell, RefCell};
use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use nima_testkit::{ByteWriter, NodeFields, document, scratch_file, tags};
use nimaloader::nima::{Actor, ActorLoader, CancelToken, Component, ComponentKind, Completion, LoadOptions, NimaError, Result};

fn png(image: &RgbaImage) -> Vec<u8> {
	let mut out = Cursor::new(Vec::new());
	image.write_to(&mut out, ImageFormat::Png).expect("png encodes");
	out.into_inner()
}

fn root_components(w: &mut ByteWriter, name: &str) {
	w.block(tags::COMPONENTS, |w| {
		w.u16(1).block(tags::NODE, |w| {
			w.node(name, Component::NO_PARENT, &NodeFields::default(), Some(false));
		});
	});
}

fn atlas_document() -> Vec<u8> {
	let color = png(&RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255])));
	let alpha = png(&RgbaImage::from_pixel(2, 2, Rgba([0, 0, 77, 255])));
	document(13, |w| {
		root_components(w, "Root");
		w.block(tags::ATLASES, |w| {
			w.u16(1).blob(&color).blob(&alpha);
		});
	})
}

fn nested_document(name: &str, assets: &[(&str, &str)]) -> Vec<u8> {
	document(13, |w| {
		w.block(tags::COMPONENTS, |w| {
			w.u16(1 + assets.len() as u16);
			w.block(tags::NODE, |w| {
				w.node(name, Component::NO_PARENT, &NodeFields::default(), Some(false));
			});
			for (index, (id, _)) in assets.iter().enumerate() {
				w.block(tags::NESTED_ACTOR_NODE, |w| {
					w.node(id, 0, &NodeFields::default(), Some(false)).bool(true).u16(1).u16(index as u16);
				});
			}
		});
		w.block(tags::NESTED_ACTOR_ASSETS, |w| {
			w.u16(assets.len() as u16);
			for (id, path) in assets {
				w.block(tags::NESTED_ACTOR_ASSET, |w| {
					w.string(id).string(path);
				});
			}
		});
	})
}

#[test]
fn callback_fires_synchronously_without_pending_work() {
	let bytes = document(13, |w| root_components(w, "Root"));
	let loader = ActorLoader::new();
	let fired = Cell::new(0);
	let loaded: RefCell<Option<Actor>> = RefCell::new(None);

	let done = loader
		.load_with(&bytes, |result: Result<Actor>| {
			fired.set(fired.get() + 1);
			*loaded.borrow_mut() = Some(result.expect("document loads"));
		})
		.is_done();

	assert!(done);
	assert_eq!(fired.get(), 1, "callback ran before load_with returned");
	let actor = loaded.into_inner().expect("actor delivered");
	assert_eq!(actor.components.len(), 1);
	assert!(actor.animations.is_empty());
}

#[test]
fn callback_waits_for_atlas_composition() {
	let bytes = atlas_document();
	let loader = ActorLoader::new();
	let fired = Cell::new(0);
	let loaded: RefCell<Option<Actor>> = RefCell::new(None);

	let completion = loader.load_with(&bytes, |result: Result<Actor>| {
		fired.set(fired.get() + 1);
		*loaded.borrow_mut() = Some(result.expect("atlas resolves"));
	});
	assert_eq!(fired.get(), 0, "atlas work is still pending");

	let Completion::Pending(pending) = completion else {
		panic!("expected pending completion");
	};
	pollster::block_on(pending);
	assert_eq!(fired.get(), 1);

	let actor = loaded.take().expect("actor delivered");
	let image = actor.atlases[0].image.as_ref().expect("atlas composited");
	assert_eq!(image.dimensions(), (2, 2));
	assert_eq!(image.get_pixel(1, 1).0, [10, 20, 30, 77]);
}

#[test]
fn decode_failure_reaches_the_callback() {
	let mut bytes = document(13, |w| root_components(w, "Root"));
	bytes[0] = b'X';
	let loader = ActorLoader::new();
	let failed = Cell::new(false);

	let completion = loader.load_with(&bytes, |result: Result<Actor>| {
		failed.set(matches!(result, Err(NimaError::BadSignature { .. })));
	});
	assert!(completion.is_done());
	assert!(failed.get());

	let lenient = ActorLoader::new().with_options(LoadOptions::lenient());
	let actor = pollster::block_on(lenient.load(&bytes)).expect("lenient load succeeds");
	assert_eq!(actor.components.len(), 1);
}

#[test]
fn corrupt_atlas_fails_the_load() {
	let bytes = document(13, |w| {
		root_components(w, "Root");
		w.block(tags::ATLASES, |w| {
			w.u16(1).blob(b"not a png").blob(b"nor this");
		});
	});

	let err = pollster::block_on(ActorLoader::new().load(&bytes)).expect_err("atlas decode fails");
	assert!(matches!(err, NimaError::Atlas { index: 0, .. }), "got {err:?}");

	let actor = pollster::block_on(ActorLoader::new().without_image_service().load(&bytes)).expect("atlases skipped");
	assert!(actor.atlases[0].image.is_none());
}

#[test]
fn cancelled_token_completes_with_cancelled() {
	let bytes = atlas_document();
	let token = CancelToken::new();
	let loader = ActorLoader::new().with_cancel_token(token.clone());
	token.cancel();

	let outcome: RefCell<Option<Result<Actor>>> = RefCell::new(None);
	{
		let completion = loader.load_with(&bytes, |result| {
			*outcome.borrow_mut() = Some(result);
		});
		if let Completion::Pending(pending) = completion {
			pollster::block_on(pending);
		}
	}
	assert!(matches!(outcome.into_inner(), Some(Err(NimaError::Cancelled))));
}

#[test]
fn load_file_reads_from_disk() {
	let path = scratch_file("load_file_reads_from_disk.nima", &document(13, |w| root_components(w, "Disk")));

	let actor = pollster::block_on(ActorLoader::new().load_file(&path)).expect("file loads");
	assert_eq!(actor.component(0).map(|item| item.name.as_str()), Some("Disk"));

	let missing = path.with_file_name("load_file_missing.nima");
	let err = pollster::block_on(ActorLoader::new().load_file(&missing)).expect_err("missing file fails");
	assert!(matches!(err, NimaError::Io(_)));
}

#[test]
fn directory_loader_resolves_nested_actors_recursively() {
	let leaf = scratch_file("nested_leaf.nima", &nested_document("Leaf", &[]));
	scratch_file("nested_mid.nima", &nested_document("Mid", &[("leaf", "nested_leaf.nima")]));
	let top = nested_document("Top", &[("mid", "nested_mid.nima")]);
	let dir = leaf.parent().expect("scratch dir").to_path_buf();

	let actor = pollster::block_on(ActorLoader::new().with_nested_dir(&dir).load(&top)).expect("nested load");

	let ComponentKind::NestedActorNode(node) = &actor.component(1).expect("nested node").kind else {
		panic!("expected nested actor node");
	};
	let mid = actor.nested_assets[node.asset.expect("asset attached")].actor.as_ref().expect("mid resolved");
	assert_eq!(mid.component(0).map(|item| item.name.as_str()), Some("Mid"));
	let leaf = mid.nested_assets[0].actor.as_ref().expect("leaf resolved");
	assert_eq!(leaf.component(0).map(|item| item.name.as_str()), Some("Leaf"));
}

#[test]
fn directory_loader_stops_at_max_depth() {
	let path = scratch_file("nested_loop.nima", &nested_document("Loop", &[("self", "nested_loop.nima")]));
	let dir = path.parent().expect("scratch dir").to_path_buf();
	let options = LoadOptions {
		max_nested_depth: 2,
		..LoadOptions::default()
	};

	let err = pollster::block_on(ActorLoader::new().with_options(options).with_nested_dir(&dir).load_file(&path)).expect_err("cycle is bounded");
	assert!(matches!(err, NimaError::NestedLoad { ref id, .. } if id == "self"));
	assert!(err.to_string().contains("nested actor depth exceeded (max=2)"), "got {err}");
}

#[test]
fn directory_loader_rejects_paths_outside_its_root() {
	let outside = scratch_file("nested_outside.nima", &nested_document("Outside", &[]));
	let dir = outside.parent().expect("scratch dir").to_path_buf();
	let climbing = "../nima_testkit/nested_outside.nima".to_owned();
	let absolute = outside.display().to_string();

	for path in [climbing, absolute] {
		let top = nested_document("Top", &[("escape", path.as_str())]);
		let err = pollster::block_on(ActorLoader::new().with_nested_dir(&dir).load(&top)).expect_err("path is rejected");
		let NimaError::NestedLoad { id, source } = err else {
			panic!("expected nested load error, got {err:?}");
		};
		assert_eq!(id, "escape");
		assert!(matches!(*source, NimaError::NestedPathEscapes { path: ref rejected } if *rejected == path), "got {source:?}");
	}
}

#[test]
fn nested_assets_stay_unresolved_without_loader() {
	let bytes = nested_document("Top", &[("child", "child.nima")]);
	let loader = ActorLoader::new();
	let completion = loader.load_with(&bytes, |result: Result<Actor>| {
		let actor = result.expect("loads without nested loader");
		assert!(actor.nested_assets[0].actor.is_none());
	});
	assert!(completion.is_done());
}
