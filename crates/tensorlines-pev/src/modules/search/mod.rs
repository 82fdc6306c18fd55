pub mod driver;
pub mod evaluator;
pub mod pev;
pub mod sujudi_haimes;

// Re-export the main public API
pub use driver::{
    find_parallel_eigenvectors, find_parallel_eigenvectors_barycentric,
    find_parallel_eigenvectors_legacy, find_parallel_eigenvectors_with_stats,
    find_tensor_sujudi_haimes, find_tensor_sujudi_haimes_barycentric,
    find_tensor_sujudi_haimes_with_stats, root_search,
};

pub use evaluator::{Evaluator, SearchResult};

pub use pev::PevEvaluator;

pub use sujudi_haimes::SujudiHaimesEvaluator;
