use aide::OperationInput;
use axum::extract::{multipart::Field, FromRef, FromRequest, Multipart, Request};

use crate::{error::Error, ingest};

pub const TITLE_FIELD: &str = "title";
pub const FILE_FIELD: &str = "file";

/// Largest number of bytes a single upload may stage.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

/// The full contents of one uploaded file.
///
/// The bytes live in a buffer owned by the request that uploaded them, so
/// concurrent uploads never share staging space, and the buffer is freed on
/// every exit path.
#[derive(Debug)]
pub struct Staged {
	pub file_name: Option<String>,
	bytes: Vec<u8>,
}

impl Staged {
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn size(&self) -> usize {
		self.bytes.len()
	}

	async fn read(mut field: Field<'_>, limit: UploadLimit) -> Result<Self, ingest::Error> {
		let file_name = field.file_name().map(ToOwned::to_owned);
		let mut bytes = Vec::new();

		while let Some(chunk) = field.chunk().await.map_err(ingest::Error::from_multipart)? {
			if bytes.len() + chunk.len() > limit.0 {
				return Err(ingest::Error::TooLarge);
			}

			bytes.extend_from_slice(&chunk);
		}

		Ok(Self { file_name, bytes })
	}
}

#[cfg(test)]
impl From<&[u8]> for Staged {
	fn from(bytes: &[u8]) -> Self {
		Self {
			file_name: None,
			bytes: bytes.to_vec(),
		}
	}
}

/// The parts of a post upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
	pub title: Option<String>,
	pub file: Option<Staged>,
}

/// Extractor that reads a whole `multipart/form-data` upload into memory.
///
/// The handler only runs once every part has been received, so a partial
/// upload can never reach the store. Parts other than `title` and `file` are
/// skipped.
///
/// ```rust
/// async fn route(Upload(form): Upload) {
///   // form.file holds the complete upload
/// }
/// ```
pub struct Upload(pub UploadForm);

#[axum::async_trait]
impl<S> FromRequest<S> for Upload
where
	UploadLimit: FromRef<S>,
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let limit = UploadLimit::from_ref(state);
		let mut multipart = Multipart::from_request(req, state)
			.await
			.map_err(ingest::Error::Malformed)?;
		let mut form = UploadForm::default();

		while let Some(field) = multipart
			.next_field()
			.await
			.map_err(ingest::Error::from_multipart)?
		{
			let name = field.name().map(ToOwned::to_owned);

			match name.as_deref() {
				Some(TITLE_FIELD) => {
					form.title = Some(field.text().await.map_err(ingest::Error::from_multipart)?);
				}
				Some(FILE_FIELD) => {
					if form.file.is_some() {
						return Err(ingest::Error::MultipleFiles.into());
					}

					form.file = Some(Staged::read(field, limit).await?);
				}
				_ => {}
			}
		}

		Ok(Self(form))
	}
}

impl OperationInput for Upload {}
