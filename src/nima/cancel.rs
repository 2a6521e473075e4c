use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{AbortHandle, Abortable};

use crate::nima::{NimaError, Result};

/// Shared cancellation signal honored at every asset-resolution suspension point.
///
/// Clones observe the same signal. Cancelling aborts every guarded operation that is still pending and
/// makes later guards fail immediately.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
	inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
	cancelled: AtomicBool,
	next_id: AtomicU64,
	pending: Mutex<HashMap<u64, AbortHandle>>,
}

/// Removes its abort handle from the token when the guarded op finishes or is dropped.
struct Registration<'a> {
	token: &'a CancelToken,
	id: Option<u64>,
}

impl Drop for Registration<'_> {
	fn drop(&mut self) {
		if let Some(id) = self.id {
			self.token.pending().remove(&id);
		}
	}
}

impl CancelToken {
	/// Create a token that has not been cancelled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancel every pending and future guarded operation.
	pub fn cancel(&self) {
		self.inner.cancelled.store(true, Ordering::SeqCst);
		let handles = std::mem::take(&mut *self.pending());
		tracing::debug!(pending = handles.len(), "cancelling asset resolution");
		for handle in handles.into_values() {
			handle.abort();
		}
	}

	/// Return `true` once [`CancelToken::cancel`] has been called.
	pub fn is_cancelled(&self) -> bool {
		self.inner.cancelled.load(Ordering::SeqCst)
	}

	/// Run `op` until it completes or the token is cancelled.
	pub async fn guard<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
		let (handle, registration) = AbortHandle::new_pair();
		let _registered = self.register(handle);
		match Abortable::new(op, registration).await {
			Ok(result) => result,
			Err(_aborted) => Err(NimaError::Cancelled),
		}
	}

	fn register(&self, handle: AbortHandle) -> Registration<'_> {
		let mut pending = self.pending();
		// Checked under the lock so a concurrent cancel cannot miss this handle.
		if self.is_cancelled() {
			handle.abort();
			return Registration { token: self, id: None };
		}
		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		pending.insert(id, handle);
		Registration { token: self, id: Some(id) }
	}

	fn pending(&self) -> MutexGuard<'_, HashMap<u64, AbortHandle>> {
		self.inner.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

#[cfg(test)]
mod tests {
	use futures::FutureExt;
	use futures::future::{self, Either};

	use super::CancelToken;
	use crate::nima::NimaError;

	#[test]
	fn guard_passes_results_through() {
		let token = CancelToken::new();
		let value = pollster::block_on(token.guard(async { Ok(7) }));
		assert_eq!(value.expect("not cancelled"), 7);
	}

	#[test]
	fn cancelled_token_fails_new_guards() {
		let token = CancelToken::new();
		token.clone().cancel();
		assert!(token.is_cancelled());

		let result = pollster::block_on(token.guard(async { Ok(()) }));
		assert!(matches!(result, Err(NimaError::Cancelled)));
	}

	#[test]
	fn cancel_aborts_pending_guard() {
		let token = CancelToken::new();
		let pending = token.guard(future::pending::<crate::nima::Result<()>>());
		let canceller = async {
			token.cancel();
		};

		let result = pollster::block_on(async {
			futures::pin_mut!(pending);
			futures::pin_mut!(canceller);
			match future::select(pending, canceller).await {
				Either::Left((result, _)) => result,
				Either::Right(((), pending)) => pending.await,
			}
		});
		assert!(matches!(result, Err(NimaError::Cancelled)));
	}

	#[test]
	fn finished_guards_release_their_handles() {
		let token = CancelToken::new();
		for value in 0..1000 {
			let result = pollster::block_on(token.guard(async move { Ok(value) }));
			assert_eq!(result.expect("not cancelled"), value);
		}
		assert!(token.pending().is_empty());
	}

	#[test]
	fn dropped_guard_releases_its_handle() {
		let token = CancelToken::new();
		let mut guarded = Box::pin(token.guard(future::pending::<crate::nima::Result<()>>()));
		assert!((&mut guarded).now_or_never().is_none());
		assert_eq!(token.pending().len(), 1);

		drop(guarded);
		assert!(token.pending().is_empty());
	}
}
