//! Turns an uploaded file into a post body.
//!
//! The upload has already been fully staged by the [`Upload`] extractor when
//! these functions run. They check the remaining form fields and only then
//! hand the bytes to the store, so a rejected upload never writes anything.
//!
//! [`Upload`]: crate::extract::Upload

use axum::{
	extract::multipart::{MultipartError, MultipartRejection},
	http::StatusCode,
};

use crate::{
	error::{self, ErrorShape},
	extract::{UploadForm, FILE_FIELD, TITLE_FIELD},
	store::{self, ContentStore},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("you have to have a title")]
	EmptyTitle,
	#[error("missing file part `file`")]
	MissingFile,
	#[error("expected exactly one file part")]
	MultipleFiles,
	#[error("upload is too large")]
	TooLarge,
	#[error("invalid upload: {0}")]
	Malformed(MultipartRejection),
	#[error("failed to receive file: {0}")]
	Read(MultipartError),
	#[error(transparent)]
	Store(#[from] store::Error),
}

impl Error {
	/// Body limit violations surface as multipart errors, everything else
	/// is a failed read.
	pub fn from_multipart(error: MultipartError) -> Self {
		if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
			Self::TooLarge
		} else {
			Self::Read(error)
		}
	}
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::EmptyTitle | Self::MissingFile | Self::MultipleFiles | Self::Malformed(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
			Self::Read(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Store(error) => error.status(),
		}
	}

	fn errors(&self) -> Vec<error::Message> {
		match self {
			Self::EmptyTitle => error::Message::new(self.to_string())
				.field(TITLE_FIELD)
				.into_vec(),
			Self::MissingFile | Self::MultipleFiles => error::Message::new(self.to_string())
				.field(FILE_FIELD)
				.into_vec(),
			Self::TooLarge | Self::Malformed(..) => {
				error::Message::new(self.to_string()).into_vec()
			}
			Self::Read(..) => error::Message::new("failed to receive file").into_vec(),
			Self::Store(error) => error.errors(),
		}
	}
}

/// Creates a post from an upload. The title is checked before anything else.
pub async fn create(store: &dyn ContentStore, form: UploadForm) -> Result<i32, Error> {
	let title = form
		.title
		.filter(|title| !title.is_empty())
		.ok_or(Error::EmptyTitle)?;
	let file = form.file.ok_or(Error::MissingFile)?;

	let id = store.create_post(&title, file.bytes()).await?;

	tracing::info!(
		id,
		title = %title,
		file_name = ?file.file_name,
		bytes = file.size(),
		"created post"
	);

	Ok(id)
}

/// Replaces the body of an existing post with an upload.
pub async fn update(store: &dyn ContentStore, id: i32, form: UploadForm) -> Result<(), Error> {
	let file = form.file.ok_or(Error::MissingFile)?;

	store.update_post(id, file.bytes()).await?;

	tracing::info!(
		id,
		file_name = ?file.file_name,
		bytes = file.size(),
		"updated post"
	);

	Ok(())
}
