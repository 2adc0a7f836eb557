mod bootstrap;
mod config;
mod context;
mod error;
mod evaluation;
mod fallback;
mod gender;
mod inventory;
mod morphology;
mod pipeline;
mod seed;
mod trie;

pub use bootstrap::{Affinities, Bootstrapper, RoundOutcome};
pub use config::{Fallback, InductionConfig, MorphoStatistics, MorphologyModel};
pub use context::{ContextIndex, ContextSignature, ContextStatistics, Occurrence, SignatureId};
pub use error::InductionError;
pub use evaluation::{Evaluation, Snapshot, SnapshotLog, Warning, evaluate};
pub use fallback::DefaultResolver;
pub use gender::{Gender, GenderMap, GoldGender};
pub use inventory::{LabelSource, LabelView, Noun, NounId, NounInventory, normalize_base_form, suffix_of};
pub use morphology::{MorphologicalClassifier, SuffixStatistics};
pub use pipeline::{Pipeline, Stage};
pub use seed::{
    GoldAnnotator, SeedLabeler, SeedLexicon, SeedSelection, SeedSelector, rank_candidates,
    select_seeds,
};
pub use trie::SuffixTrie;
