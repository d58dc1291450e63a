//! Filesystem implementations of the planner's loader and storage seams.

pub mod assets;
pub mod files;

pub use assets::AssetLoader;
pub use files::FileStorage;

use giftplan_core::PlannerEngine;
use std::path::Path;

/// Create an engine reading assets from `data_dir` and slots from `state_dir`
pub fn create_file_engine(
    data_dir: &Path,
    state_dir: &Path,
) -> PlannerEngine<AssetLoader, FileStorage> {
    PlannerEngine::new(AssetLoader::new(data_dir), FileStorage::new(state_dir))
}
