// Application layer - Use case interactors

pub mod container;
pub mod pipeline_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use pipeline_interactor::{PipelineInteractor, PipelineSettings};
