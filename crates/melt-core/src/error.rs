use thiserror::Error;

/// An error loading or describing MELT entities.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to read model file {0}")]
    ModelFileError(String, #[source] std::io::Error),

    #[error(transparent)]
    YamlError(#[from] serde_yaml::Error),
}
