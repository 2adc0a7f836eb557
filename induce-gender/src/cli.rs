use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use gender_induction::{
    ContextStatistics, Fallback, Gender, GoldAnnotator, InductionConfig, MorphoStatistics,
    MorphologyModel, SeedLabeler, SeedLexicon,
};

use crate::corpus::{ContextType, ContextWordForm, CorpusOptions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistics {
    Token,
    Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultGender {
    Masc,
    Fem,
    Neut,
    /// Whichever gender was induced most often before the default is applied.
    MostFrequent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    /// Fixed-length suffix majority vote.
    Suffix,
    /// Smoothed trie over all suffix lengths.
    Trie,
}

/// Minimally supervised induction of grammatical gender from a PDT-tagged corpus.
#[derive(Parser, Debug, Clone, serde::Serialize)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// CoNLL-U corpus with Prague Dependency Treebank tags in the XPOS column
    #[arg(
        long,
        default_value = "data/ud-treebanks-v2.14/UD_Czech-PDT/cs_pdt-ud-train.conllu"
    )]
    pub corpus_path: PathBuf,

    /// Number of seed nouns for every gender
    #[arg(long, default_value_t = 15)]
    pub num_seeds: usize,

    #[arg(long, value_enum, default_value_t = ContextType::Bilateral)]
    pub context_type: ContextType,

    #[arg(long, value_enum, default_value_t = ContextWordForm::Suffix)]
    pub context_word_form: ContextWordForm,

    /// How repeated noun/context co-occurrences are counted
    #[arg(long, value_enum, default_value_t = Statistics::Type)]
    pub context_statistics: Statistics,

    /// How nouns are weighted in the morphological model
    #[arg(long, value_enum, default_value_t = Statistics::Token)]
    pub morpho_statistics: Statistics,

    /// Gender assigned to nouns no other stage could label
    #[arg(long, value_enum, default_value_t = DefaultGender::Fem)]
    pub default_gender: DefaultGender,

    /// Drop contexts seen with this many non-noun words per noun or more
    #[arg(long, default_value_t = 1.5)]
    pub non_noun_to_noun_ratio_threshold: f64,

    /// Bootstrapping assigns a gender only above this probability
    #[arg(long, default_value_t = 0.4)]
    pub gender_prob_threshold: f64,

    /// Required lead of the best gender over the runner-up during bootstrapping
    #[arg(long, default_value_t = 0.0)]
    pub margin_threshold: f64,

    /// Stop bootstrapping after this many rounds
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Stop bootstrapping after this many seconds
    #[arg(long)]
    pub time_budget_secs: Option<f64>,

    #[arg(long, value_enum, default_value_t = Model::Suffix)]
    pub morphology_model: Model,

    /// Suffix length for the suffix model
    #[arg(long, default_value_t = 3)]
    pub suffix_length: usize,

    /// Minimum majority share for the morphological stage [default: 0.5 for
    /// the suffix model, 0 for the trie model]
    #[arg(long)]
    pub morphology_threshold: Option<f64>,

    /// Trie smoothing exponent
    #[arg(long, default_value_t = 0.2)]
    pub alpha: f64,

    /// Trie smoothing weight
    #[arg(long, default_value_t = 0.99)]
    pub beta: f64,

    /// Warn when coverage before the default stage is below this
    #[arg(long, default_value_t = 0.05)]
    pub low_coverage_warning: f64,

    /// JSON object mapping base forms to MASC, FEM or NEUT. Without it, seed
    /// genders are read from the corpus tags.
    #[arg(long)]
    pub seed_lexicon: Option<PathBuf>,

    /// Directory receiving one subdirectory per run
    #[arg(long, env = "OUT_DIR", default_value = "out")]
    pub out_dir: PathBuf,
}

impl Statistics {
    fn context(self) -> ContextStatistics {
        match self {
            Statistics::Token => ContextStatistics::Token,
            Statistics::Type => ContextStatistics::Type,
        }
    }

    fn morpho(self) -> MorphoStatistics {
        match self {
            Statistics::Token => MorphoStatistics::Token,
            Statistics::Type => MorphoStatistics::Type,
        }
    }
}

impl Args {
    pub fn induction_config(&self) -> InductionConfig {
        InductionConfig {
            seeds_per_gender: self.num_seeds,
            max_rounds: self.max_rounds,
            time_budget_secs: self.time_budget_secs,
            confidence_threshold: self.gender_prob_threshold,
            margin_threshold: self.margin_threshold,
            suffix_length: self.suffix_length,
            morphology_threshold: self.morphology_threshold.unwrap_or(match self.morphology_model {
                Model::Suffix => 0.5,
                Model::Trie => 0.0,
            }),
            morphology_model: match self.morphology_model {
                Model::Suffix => MorphologyModel::FixedSuffix,
                Model::Trie => MorphologyModel::SmoothedTrie {
                    alpha: self.alpha,
                    beta: self.beta,
                },
            },
            morpho_statistics: self.morpho_statistics.morpho(),
            fallback: match self.default_gender {
                DefaultGender::Masc => Fallback::Fixed(Gender::Masculine),
                DefaultGender::Fem => Fallback::Fixed(Gender::Feminine),
                DefaultGender::Neut => Fallback::Fixed(Gender::Neuter),
                DefaultGender::MostFrequent => Fallback::MostFrequent,
            },
            low_coverage_warning: self.low_coverage_warning,
        }
    }

    pub fn corpus_options(&self) -> CorpusOptions {
        CorpusOptions {
            context_type: self.context_type,
            context_word_form: self.context_word_form,
            context_statistics: self.context_statistics.context(),
            non_noun_to_noun_ratio_threshold: self.non_noun_to_noun_ratio_threshold,
        }
    }

    pub fn seed_labeler(&self) -> anyhow::Result<Box<dyn SeedLabeler>> {
        let Some(path) = &self.seed_lexicon else {
            return Ok(Box::new(GoldAnnotator));
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed lexicon {}", path.display()))?;
        let entries: BTreeMap<String, Gender> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse seed lexicon {}", path.display()))?;
        let lexicon = SeedLexicon::new(entries);
        if lexicon.is_empty() {
            log::warn!("Seed lexicon {} has no entries", path.display());
        }
        log::info!("Loaded {} seed lexicon entries", lexicon.len());
        Ok(Box::new(lexicon))
    }
}
