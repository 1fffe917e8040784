use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Error loading sample configuration: {0}")]
    Load(#[from] collapsar_models::LoadError),

    #[error("Model construction error: {0}")]
    Model(#[from] collapsar_models::ModelError),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}
