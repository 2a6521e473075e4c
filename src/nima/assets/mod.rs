use futures::future::{self, LocalBoxFuture};
use image::RgbaImage;

use crate::nima::{Actor, Atlas, CancelToken, NestedActorAsset, NimaError, Result};

/// Asynchronous image decode and atlas composition.
pub trait ImageService {
	/// Decode compressed image bytes.
	fn decode<'a>(&'a self, bytes: &'a [u8]) -> LocalBoxFuture<'a, Result<RgbaImage>>;

	/// Merge a color image and a separate alpha image into one texture.
	fn composite(&self, color: RgbaImage, alpha: RgbaImage) -> LocalBoxFuture<'_, Result<RgbaImage>>;
}

/// Loader for sub-documents referenced by the nested asset table.
pub trait NestedActorLoader {
	/// Load the actor an asset record points at.
	fn load<'a>(&'a self, asset: &'a NestedActorAsset) -> LocalBoxFuture<'a, Result<Actor>>;
}

/// [`ImageService`] backed by the `image` crate (PNG and JPEG).
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImageService;

impl RasterImageService {
	/// Copy the alpha image's intensity into the color image's alpha channel.
	pub fn composite_now(mut color: RgbaImage, alpha: &RgbaImage) -> Result<RgbaImage> {
		if color.dimensions() != alpha.dimensions() {
			return Err(NimaError::AtlasSizeMismatch {
				color: color.dimensions(),
				alpha: alpha.dimensions(),
			});
		}
		for (pixel, mask) in color.pixels_mut().zip(alpha.pixels()) {
			pixel.0[3] = mask.0[2];
		}
		Ok(color)
	}
}

impl ImageService for RasterImageService {
	fn decode<'a>(&'a self, bytes: &'a [u8]) -> LocalBoxFuture<'a, Result<RgbaImage>> {
		Box::pin(async move { Ok(image::load_from_memory(bytes)?.to_rgba8()) })
	}

	fn composite(&self, color: RgbaImage, alpha: RgbaImage) -> LocalBoxFuture<'_, Result<RgbaImage>> {
		Box::pin(async move { Self::composite_now(color, &alpha) })
	}
}

/// Collaborators consulted while finishing a load.
#[derive(Clone, Copy)]
pub(crate) struct Resolvers<'a> {
	pub(crate) images: Option<&'a dyn ImageService>,
	pub(crate) nested: Option<&'a dyn NestedActorLoader>,
	pub(crate) cancel: &'a CancelToken,
}

/// Decode every atlas and load every nested asset, attaching results once all of them complete.
///
/// Nothing is attached unless both joins succeed; the first failure (or cancellation) is returned.
pub(crate) async fn resolve_assets(actor: &mut Actor, resolvers: Resolvers<'_>) -> Result<()> {
	let atlases = resolve_atlases(&actor.atlases, resolvers);
	let nested = resolve_nested(&actor.nested_assets, resolvers);
	let (images, actors) = future::try_join(atlases, nested).await?;

	if let Some(images) = images {
		for (atlas, image) in actor.atlases.iter_mut().zip(images) {
			atlas.image = Some(image);
		}
	}
	if let Some(actors) = actors {
		for (asset, nested) in actor.nested_assets.iter_mut().zip(actors) {
			asset.actor = Some(Box::new(nested));
		}
	}
	Ok(())
}

async fn resolve_atlases(atlases: &[Atlas], resolvers: Resolvers<'_>) -> Result<Option<Vec<RgbaImage>>> {
	let Some(images) = resolvers.images else {
		if !atlases.is_empty() {
			tracing::debug!(atlases = atlases.len(), "no image service, atlases left unresolved");
		}
		return Ok(None);
	};

	let pending = atlases.iter().enumerate().map(move |(index, atlas)| async move {
		resolvers
			.cancel
			.guard(composite_atlas(images, atlas))
			.await
			.map_err(|err| wrap_atlas(index, err))
	});
	let resolved = future::try_join_all(pending).await?;
	tracing::debug!(atlases = resolved.len(), "atlases resolved");
	Ok(Some(resolved))
}

async fn composite_atlas(images: &dyn ImageService, atlas: &Atlas) -> Result<RgbaImage> {
	let (color, alpha) = future::try_join(images.decode(&atlas.color), images.decode(&atlas.alpha)).await?;
	images.composite(color, alpha).await
}

async fn resolve_nested(assets: &[NestedActorAsset], resolvers: Resolvers<'_>) -> Result<Option<Vec<Actor>>> {
	let Some(loader) = resolvers.nested else {
		if !assets.is_empty() {
			tracing::debug!(assets = assets.len(), "no nested loader, nested assets left unresolved");
		}
		return Ok(None);
	};

	let pending = assets.iter().map(move |asset| async move {
		resolvers.cancel.guard(loader.load(asset)).await.map_err(|err| match err {
			NimaError::Cancelled => NimaError::Cancelled,
			err => NimaError::NestedLoad {
				id: asset.id.clone(),
				source: Box::new(err),
			},
		})
	});
	let resolved = future::try_join_all(pending).await?;
	tracing::debug!(assets = resolved.len(), "nested assets resolved");
	Ok(Some(resolved))
}

fn wrap_atlas(index: usize, err: NimaError) -> NimaError {
	match err {
		NimaError::Cancelled => NimaError::Cancelled,
		err => NimaError::Atlas {
			index,
			source: Box::new(err),
		},
	}
}

#[cfg(test)]
mod tests;
