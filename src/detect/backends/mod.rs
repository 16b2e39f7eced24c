pub mod scripted;
pub mod stub;

#[cfg(feature = "model-tract")]
pub mod tract;

pub use scripted::ScriptedModel;
pub use stub::StubModel;

#[cfg(feature = "model-tract")]
pub use tract::TractModel;
