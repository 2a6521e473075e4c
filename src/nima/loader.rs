use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::nima::assets::{ImageService, NestedActorLoader, RasterImageService, Resolvers, resolve_assets};
use crate::nima::document::decode_document;
use crate::nima::{Actor, CancelToken, NestedActorAsset, NimaError, Result, SignaturePolicy};

/// Document load configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
	/// How a wrong leading signature is treated.
	pub signature: SignaturePolicy,
	/// Deepest nested actor level loaded through [`DirectoryNestedLoader`].
	pub max_nested_depth: u32,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			signature: SignaturePolicy::Strict,
			max_nested_depth: 8,
		}
	}
}

impl LoadOptions {
	/// Options that accept documents with a wrong signature.
	pub fn lenient() -> Self {
		Self {
			signature: SignaturePolicy::Lenient,
			..Self::default()
		}
	}
}

/// Outcome of [`ActorLoader::load_with`].
#[must_use = "pending work only completes when the future is driven"]
pub enum Completion<'a> {
	/// The callback already ran.
	Done,
	/// Asset resolution is pending; the callback runs when this future completes.
	Pending(LocalBoxFuture<'a, ()>),
}

impl Completion<'_> {
	/// Return `true` when the callback already ran.
	pub fn is_done(&self) -> bool {
		matches!(self, Self::Done)
	}
}

impl fmt::Debug for Completion<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Done => f.write_str("Completion::Done"),
			Self::Pending(_) => f.write_str("Completion::Pending(..)"),
		}
	}
}

#[derive(Clone)]
enum NestedSource {
	None,
	Loader(Rc<dyn NestedActorLoader>),
	Directory(PathBuf),
}

/// Loads documents and resolves their atlases and nested actors.
///
/// The default loader decodes atlases with [`RasterImageService`] and leaves nested assets
/// unresolved.
#[derive(Clone)]
pub struct ActorLoader {
	options: LoadOptions,
	images: Option<Rc<dyn ImageService>>,
	nested: NestedSource,
	cancel: CancelToken,
	depth: u32,
}

impl Default for ActorLoader {
	fn default() -> Self {
		Self {
			options: LoadOptions::default(),
			images: Some(Rc::new(RasterImageService)),
			nested: NestedSource::None,
			cancel: CancelToken::new(),
			depth: 0,
		}
	}
}

impl fmt::Debug for ActorLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let nested = match &self.nested {
			NestedSource::None => "none".to_owned(),
			NestedSource::Loader(_) => "custom".to_owned(),
			NestedSource::Directory(root) => root.display().to_string(),
		};
		f.debug_struct("ActorLoader")
			.field("options", &self.options)
			.field("images", &self.images.is_some())
			.field("nested", &nested)
			.field("depth", &self.depth)
			.finish()
	}
}

impl ActorLoader {
	/// Create a loader with default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace load options.
	pub fn with_options(mut self, options: LoadOptions) -> Self {
		self.options = options;
		self
	}

	/// Decode atlases with `images`.
	pub fn with_image_service(mut self, images: impl ImageService + 'static) -> Self {
		self.images = Some(Rc::new(images));
		self
	}

	/// Leave atlases undecoded.
	pub fn without_image_service(mut self) -> Self {
		self.images = None;
		self
	}

	/// Resolve nested assets through `loader`.
	pub fn with_nested_loader(mut self, loader: impl NestedActorLoader + 'static) -> Self {
		self.nested = NestedSource::Loader(Rc::new(loader));
		self
	}

	/// Resolve nested asset paths relative to `root`, loading them with this loader's settings.
	pub fn with_nested_dir(mut self, root: impl Into<PathBuf>) -> Self {
		self.nested = NestedSource::Directory(root.into());
		self
	}

	/// Honor `cancel` at every suspension point.
	pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
		self.cancel = cancel;
		self
	}

	/// Active load options.
	pub fn options(&self) -> &LoadOptions {
		&self.options
	}

	/// Token shared by every load started from this loader.
	pub fn cancel_token(&self) -> &CancelToken {
		&self.cancel
	}

	/// Decode `bytes` and resolve every atlas and nested asset.
	pub async fn load(&self, bytes: &[u8]) -> Result<Actor> {
		let mut actor = decode_document(bytes, &self.options)?;
		self.resolve(&mut actor).await?;
		Ok(actor)
	}

	/// Read a document from disk and load it.
	pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<Actor> {
		let bytes = std::fs::read(path)?;
		self.load(&bytes).await
	}

	/// Decode `bytes` and deliver the result to `on_complete` exactly once.
	///
	/// Without pending asset work the callback runs before this returns [`Completion::Done`].
	/// Otherwise it runs when the returned [`Completion::Pending`] future completes.
	pub fn load_with<'a, F>(&'a self, bytes: &[u8], on_complete: F) -> Completion<'a>
	where
		F: FnOnce(Result<Actor>) + 'a,
	{
		let mut actor = match decode_document(bytes, &self.options) {
			Ok(actor) => actor,
			Err(err) => {
				on_complete(Err(err));
				return Completion::Done;
			}
		};
		if !self.has_pending_work(&actor) {
			on_complete(Ok(actor));
			return Completion::Done;
		}

		Completion::Pending(Box::pin(async move {
			let outcome = self.resolve(&mut actor).await;
			on_complete(outcome.map(|()| actor));
		}))
	}

	fn has_pending_work(&self, actor: &Actor) -> bool {
		let atlases = self.images.is_some() && !actor.atlases.is_empty();
		let nested = !matches!(self.nested, NestedSource::None) && !actor.nested_assets.is_empty();
		atlases || nested
	}

	async fn resolve(&self, actor: &mut Actor) -> Result<()> {
		let directory;
		let nested: Option<&dyn NestedActorLoader> = match &self.nested {
			NestedSource::None => None,
			NestedSource::Loader(loader) => Some(loader.as_ref()),
			NestedSource::Directory(root) => {
				directory = DirectoryNestedLoader::new(root.clone(), self.nested_child());
				Some(&directory)
			}
		};

		resolve_assets(
			actor,
			Resolvers {
				images: self.images.as_deref(),
				nested,
				cancel: &self.cancel,
			},
		)
		.await
	}

	fn nested_child(&self) -> Self {
		Self {
			depth: self.depth + 1,
			..self.clone()
		}
	}
}

/// [`NestedActorLoader`] reading asset paths relative to a directory.
///
/// Sub-documents are loaded with the parent's options, image service and cancel token, and
/// may nest further until [`LoadOptions::max_nested_depth`] is reached. Absolute paths and
/// paths with `..` fail with [`NimaError::NestedPathEscapes`].
#[derive(Debug, Clone)]
pub struct DirectoryNestedLoader {
	root: PathBuf,
	loader: ActorLoader,
}

impl DirectoryNestedLoader {
	/// Create a loader for assets under `root`, loading them with `loader`.
	pub fn new(root: impl Into<PathBuf>, loader: ActorLoader) -> Self {
		Self { root: root.into(), loader }
	}

	/// Directory asset paths are resolved against.
	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl NestedActorLoader for DirectoryNestedLoader {
	fn load<'a>(&'a self, asset: &'a NestedActorAsset) -> LocalBoxFuture<'a, Result<Actor>> {
		Box::pin(async move {
			let max_depth = self.loader.options.max_nested_depth;
			if self.loader.depth > max_depth {
				return Err(NimaError::NestedDepthExceeded { max_depth });
			}

			let relative = Path::new(&asset.path);
			let escapes = relative
				.components()
				.any(|part| matches!(part, Component::Prefix(_) | Component::RootDir | Component::ParentDir));
			if escapes || relative.is_absolute() {
				return Err(NimaError::NestedPathEscapes { path: asset.path.clone() });
			}

			let path = self.root.join(relative);
			tracing::debug!(id = %asset.id, path = %path.display(), depth = self.loader.depth, "loading nested actor");
			self.loader.load_file(&path).await
		})
	}
}
