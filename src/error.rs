use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("image backend failure: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// A pixel buffer was built from rows of differing lengths.
    #[error("row {row} has {found} pixels, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Neither the requested source nor the built-in fallback could be decoded.
    #[error("could not load '{locator}' nor the fallback '{}'", .fallback.display())]
    SourceUnavailable { locator: String, fallback: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
