use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use image::{Rgba, RgbaImage};

use super::{ImageService, NestedActorLoader, RasterImageService, Resolvers, resolve_assets};
use crate::nima::{Actor, Atlas, CancelToken, Component, ComponentKind, DataVersion, NestedActorAsset, NimaError, Node, Result};

/// Completes after being polled `n` extra times.
struct Delay(u8);

impl Future for Delay {
	type Output = ();

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if self.0 == 0 {
			return Poll::Ready(());
		}
		self.0 -= 1;
		cx.waker().wake_by_ref();
		Poll::Pending
	}
}

/// Image bytes are `[delay, gray]`; an empty slice fails to decode.
#[derive(Default)]
struct FakeImages {
	finished: RefCell<Vec<u8>>,
}

impl ImageService for FakeImages {
	fn decode<'a>(&'a self, bytes: &'a [u8]) -> LocalBoxFuture<'a, Result<RgbaImage>> {
		Box::pin(async move {
			let [delay, gray] = bytes else {
				return Err(NimaError::Image {
					reason: "unreadable".to_owned(),
				});
			};
			Delay(*delay).await;
			Ok(RgbaImage::from_pixel(1, 1, Rgba([*gray, *gray, *gray, 255])))
		})
	}

	fn composite(&self, color: RgbaImage, alpha: RgbaImage) -> LocalBoxFuture<'_, Result<RgbaImage>> {
		Box::pin(async move {
			let merged = RasterImageService::composite_now(color, &alpha)?;
			self.finished.borrow_mut().push(merged.get_pixel(0, 0).0[0]);
			Ok(merged)
		})
	}
}

/// Asset paths hold the delay; `fail` errors and `stop` cancels `token` then never completes.
#[derive(Default)]
struct FakeLoader {
	token: CancelToken,
	finished: RefCell<Vec<String>>,
}

impl NestedActorLoader for FakeLoader {
	fn load<'a>(&'a self, asset: &'a NestedActorAsset) -> LocalBoxFuture<'a, Result<Actor>> {
		Box::pin(async move {
			match asset.path.as_str() {
				"fail" => return Err(NimaError::NestedDepthExceeded { max_depth: 0 }),
				"stop" => {
					self.token.cancel();
					return future::pending().await;
				}
				_ => {}
			}
			let delay = asset.path.parse().unwrap_or(0);
			Delay(delay).await;
			let mut actor = Actor::new(DataVersion(13));
			actor.push_component(Some(Component::new(asset.id.clone(), Component::NO_PARENT, ComponentKind::Node(Node::default()))));
			self.finished.borrow_mut().push(asset.id.clone());
			Ok(actor)
		})
	}
}

fn actor_with(atlases: &[([u8; 2], [u8; 2])], assets: &[(&str, &str)]) -> Actor {
	let mut actor = Actor::new(DataVersion(13));
	for (color, alpha) in atlases {
		actor.atlases.push(Atlas::new(color.to_vec(), alpha.to_vec()));
	}
	for (id, path) in assets {
		actor.nested_assets.push(NestedActorAsset::new(*id, *path));
	}
	actor
}

fn resolvers<'a>(images: &'a FakeImages, loader: &'a FakeLoader) -> Resolvers<'a> {
	Resolvers {
		images: Some(images),
		nested: Some(loader),
		cancel: &loader.token,
	}
}

#[test]
fn join_waits_for_every_op_in_any_completion_order() {
	let images = FakeImages::default();
	let loader = FakeLoader::default();
	let mut actor = actor_with(&[([6, 10], [1, 40]), ([0, 20], [2, 50]), ([3, 30], [0, 60])], &[("slow", "5"), ("fast", "0")]);

	pollster::block_on(resolve_assets(&mut actor, resolvers(&images, &loader))).expect("assets resolve");

	assert_eq!(*images.finished.borrow(), vec![20, 30, 10], "composites finish out of order");
	assert_eq!(*loader.finished.borrow(), vec!["fast".to_owned(), "slow".to_owned()]);

	let pixels: Vec<[u8; 4]> = actor
		.atlases
		.iter()
		.map(|atlas| atlas.image.as_ref().expect("atlas attached").get_pixel(0, 0).0)
		.collect();
	assert_eq!(pixels, vec![[10, 10, 10, 40], [20, 20, 20, 50], [30, 30, 30, 60]]);

	for asset in &actor.nested_assets {
		let nested = asset.actor.as_ref().expect("nested actor attached");
		assert_eq!(nested.component(0).map(|item| item.name.as_str()), Some(asset.id.as_str()));
	}
}

#[test]
fn no_pending_work_completes_without_suspending() {
	let images = FakeImages::default();
	let loader = FakeLoader::default();
	let mut actor = actor_with(&[], &[]);

	let outcome = resolve_assets(&mut actor, resolvers(&images, &loader)).now_or_never();
	assert!(matches!(outcome, Some(Ok(()))));
}

#[test]
fn missing_collaborators_leave_assets_unresolved() {
	let token = CancelToken::new();
	let mut actor = actor_with(&[([0, 1], [0, 2])], &[("child", "0")]);
	let bare = Resolvers {
		images: None,
		nested: None,
		cancel: &token,
	};

	pollster::block_on(resolve_assets(&mut actor, bare)).expect("nothing to resolve");
	assert!(actor.atlases[0].image.is_none());
	assert!(actor.nested_assets[0].actor.is_none());
}

#[test]
fn atlas_failure_completes_with_indexed_error() {
	let images = FakeImages::default();
	let loader = FakeLoader::default();
	let mut actor = Actor::new(DataVersion(13));
	actor.atlases.push(Atlas::new(vec![0, 1], vec![0, 2]));
	actor.atlases.push(Atlas::new(Vec::new(), vec![0, 2]));

	let err = pollster::block_on(resolve_assets(&mut actor, resolvers(&images, &loader))).expect_err("decode fails");
	let NimaError::Atlas { index, source } = err else {
		panic!("expected atlas error, got {err:?}");
	};
	assert_eq!(index, 1);
	assert!(matches!(*source, NimaError::Image { .. }));
	assert!(actor.atlases.iter().all(|atlas| atlas.image.is_none()), "nothing attached on failure");
}

#[test]
fn nested_failure_names_the_asset() {
	let images = FakeImages::default();
	let loader = FakeLoader::default();
	let mut actor = actor_with(&[], &[("ok", "1"), ("broken", "fail")]);

	let err = pollster::block_on(resolve_assets(&mut actor, resolvers(&images, &loader))).expect_err("load fails");
	assert!(matches!(err, NimaError::NestedLoad { ref id, .. } if id == "broken"), "got {err:?}");
}

#[test]
fn cancel_during_resolution_completes_with_cancelled() {
	let images = FakeImages::default();
	let loader = FakeLoader::default();
	let mut actor = actor_with(&[([4, 1], [4, 2])], &[("hang", "stop")]);

	let err = pollster::block_on(resolve_assets(&mut actor, resolvers(&images, &loader))).expect_err("load is cancelled");
	assert!(matches!(err, NimaError::Cancelled), "got {err:?}");
	assert!(actor.atlases[0].image.is_none());
}

#[test]
fn raster_composite_copies_alpha_intensity() {
	let color = RgbaImage::from_pixel(2, 1, Rgba([200, 100, 50, 255]));
	let mut alpha = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
	alpha.put_pixel(1, 0, Rgba([9, 9, 128, 255]));

	let merged = RasterImageService::composite_now(color, &alpha).expect("sizes match");
	assert_eq!(merged.get_pixel(0, 0).0, [200, 100, 50, 0]);
	assert_eq!(merged.get_pixel(1, 0).0, [200, 100, 50, 128]);
}

#[test]
fn raster_composite_rejects_size_mismatch() {
	let err = RasterImageService::composite_now(RgbaImage::new(2, 2), &RgbaImage::new(1, 2)).expect_err("sizes differ");
	assert!(matches!(err, NimaError::AtlasSizeMismatch { color: (2, 2), alpha: (1, 2) }));
}

#[test]
fn raster_service_decodes_png() {
	let source = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
	let mut encoded = std::io::Cursor::new(Vec::new());
	source.write_to(&mut encoded, image::ImageFormat::Png).expect("png encodes");
	let bytes = encoded.into_inner();

	let service = RasterImageService;
	let decoded = pollster::block_on(service.decode(&bytes)).expect("png decodes");
	assert_eq!(decoded, source);

	let err = pollster::block_on(service.decode(b"not an image")).expect_err("garbage fails");
	assert!(matches!(err, NimaError::Image { .. }));
}
