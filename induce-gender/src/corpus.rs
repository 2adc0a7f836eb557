use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, bail};
use gender_induction::{
    ContextIndex, ContextSignature, ContextStatistics, Gender, GenderMap, GoldGender,
    NounInventory, Occurrence, normalize_base_form,
};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

/// One word line of a CoNLL-U file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub form: String,
    /// Language-specific tag (XPOS column), `None` when the column is `_`.
    pub xpos: Option<String>,
}

pub type Sentence = Vec<Token>;

pub fn read_conllu(path: &Path) -> anyhow::Result<Vec<Sentence>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open corpus {}", path.display()))?;
    parse_conllu(BufReader::new(file))
        .with_context(|| format!("Failed to parse corpus {}", path.display()))
}

/// Reads sentences from CoNLL-U text.
///
/// Comment lines, multiword token ranges (`1-2`) and empty nodes (`1.1`) are
/// skipped. Any other non-blank line must have exactly ten tab-separated columns.
pub fn parse_conllu(reader: impl BufRead) -> anyhow::Result<Vec<Sentence>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() != 10 {
            bail!(
                "line {}: expected 10 tab-separated columns, found {}",
                line_idx + 1,
                columns.len()
            );
        }
        if columns[0].contains(['-', '.']) {
            continue;
        }
        current.push(Token {
            form: columns[1].to_string(),
            xpos: (columns[4] != "_").then(|| columns[4].to_string()),
        });
    }
    if !current.is_empty() {
        sentences.push(current);
    }

    Ok(sentences)
}

/// Gender of a singular nominative noun given its Prague Dependency Treebank
/// positional tag, `None` for every other tag.
///
/// Position 0 is the part of speech, 2 the gender, 3 the number and 4 the case.
/// Animate (`M`) and inanimate (`I`) masculine both map to masculine.
pub fn base_noun_gender(tag: &str) -> Option<Gender> {
    let mut positions = tag.chars();
    let pos = positions.next()?;
    let gender = positions.nth(1)?;
    let number = positions.next()?;
    let case = positions.next()?;
    if pos != 'N' || number != 'S' || case != '1' {
        return None;
    }
    match gender {
        'M' | 'I' => Some(Gender::Masculine),
        'F' => Some(Gender::Feminine),
        'N' => Some(Gender::Neuter),
        _ => None,
    }
}

/// Which neighbours of a noun contribute to its signatures.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    Left,
    Right,
    Bilateral,
}

/// How a neighbouring word is turned into signature parts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContextWordForm {
    /// The whole word.
    Word,
    /// Every suffix of the word, from the whole word down to the empty string.
    Suffix,
}

impl ContextWordForm {
    fn expand(self, word: &str) -> Vec<&str> {
        match self {
            ContextWordForm::Word => vec![word],
            ContextWordForm::Suffix => word
                .char_indices()
                .map(|(idx, _)| &word[idx..])
                .chain(std::iter::once(""))
                .collect(),
        }
    }
}

/// Signatures of a token with neighbours `left` and `right`, formatted
/// `"<left>|<right>"`. A sentence boundary is the empty word.
pub fn context_signatures(
    left: &str,
    right: &str,
    context_type: ContextType,
    word_form: ContextWordForm,
) -> Vec<String> {
    let left_parts = match context_type {
        ContextType::Left | ContextType::Bilateral => word_form.expand(left),
        ContextType::Right => vec![""],
    };
    let right_parts = match context_type {
        ContextType::Right | ContextType::Bilateral => word_form.expand(right),
        ContextType::Left => vec![""],
    };
    left_parts
        .iter()
        .cartesian_product(&right_parts)
        .map(|(left, right)| format!("{left}|{right}"))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorpusOptions {
    pub context_type: ContextType,
    pub context_word_form: ContextWordForm,
    pub context_statistics: ContextStatistics,
    /// Signatures whose non-noun to noun co-occurrence ratio reaches this are dropped.
    pub non_noun_to_noun_ratio_threshold: f64,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            context_type: ContextType::Bilateral,
            context_word_form: ContextWordForm::Suffix,
            context_statistics: ContextStatistics::Type,
            non_noun_to_noun_ratio_threshold: 1.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CorpusStats {
    pub sentences: usize,
    pub tokens: usize,
    pub nouns: usize,
    pub noun_occurrences: usize,
    pub signatures_kept: usize,
    pub signatures_filtered: usize,
}

/// Nouns and their contexts extracted from a tagged corpus.
pub struct Corpus {
    pub inventory: NounInventory,
    pub index: ContextIndex,
    pub stats: CorpusStats,
}

/// Words seen with each signature.
#[derive(Default)]
struct SignatureCounts {
    by_signature: FxHashMap<String, FxHashMap<String, u64>>,
}

impl SignatureCounts {
    fn add(&mut self, signature: &str, word: &str) {
        let words = self.by_signature.entry(signature.to_string()).or_default();
        *words.entry(word.to_string()).or_insert(0) += 1;
    }

    fn total(&self, signature: &str, statistics: ContextStatistics) -> u64 {
        self.by_signature
            .get(signature)
            .map_or(0, |words| match statistics {
                ContextStatistics::Token => words.values().sum(),
                ContextStatistics::Type => words.len() as u64,
            })
    }
}

/// Builds the noun inventory and context index from tagged sentences.
///
/// The noun list holds every form tagged as a singular nominative noun, with
/// the gender it was tagged with most often as gold. Forms tagged with several
/// genders keep that majority but are marked ambiguous. Every token whose form is
/// on the list, in any case or number, is an occurrence of that noun.
pub fn load(sentences: &[Sentence], options: &CorpusOptions) -> anyhow::Result<Corpus> {
    let forms: Vec<Vec<String>> = sentences
        .iter()
        .map(|sentence| {
            sentence
                .iter()
                .map(|token| normalize_base_form(&token.form))
                .collect()
        })
        .collect();

    let mut tagged: IndexMap<String, GenderMap<u64>> = IndexMap::new();
    for (sentence, forms) in sentences.iter().zip(&forms) {
        for (token, form) in sentence.iter().zip(forms) {
            let Some(gender) = token.xpos.as_deref().and_then(base_noun_gender) else {
                continue;
            };
            if form.is_empty() {
                continue;
            }
            *tagged.entry(form.clone()).or_default().get_mut(&gender) += 1;
        }
    }

    let pb = ProgressBar::new(forms.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sentences ({per_sec}, {eta})")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let mut frequencies: FxHashMap<&str, u64> = FxHashMap::default();
    let mut noun_contexts = SignatureCounts::default();
    let mut non_noun_contexts = SignatureCounts::default();
    let mut occurrences: Vec<(&str, Vec<String>)> = Vec::new();
    let mut tokens = 0;

    for sentence in &forms {
        pb.inc(1);
        tokens += sentence.len();
        let padded = std::iter::once("")
            .chain(sentence.iter().map(String::as_str))
            .chain(std::iter::once(""));
        for (left, form, right) in padded.tuple_windows() {
            let signatures = context_signatures(
                left,
                right,
                options.context_type,
                options.context_word_form,
            );
            if tagged.contains_key(form) {
                *frequencies.entry(form).or_insert(0) += 1;
                for signature in &signatures {
                    noun_contexts.add(signature, form);
                }
                occurrences.push((form, signatures));
            } else {
                for signature in &signatures {
                    non_noun_contexts.add(signature, form);
                }
            }
        }
    }
    pb.finish_and_clear();

    let mut kept: FxHashSet<&str> = FxHashSet::default();
    let mut signatures_filtered = 0;
    for signature in noun_contexts.by_signature.keys() {
        let nouns = noun_contexts.total(signature, options.context_statistics) as f64;
        let non_nouns = non_noun_contexts.total(signature, options.context_statistics) as f64;
        if non_nouns / nouns < options.non_noun_to_noun_ratio_threshold {
            kept.insert(signature.as_str());
        } else {
            signatures_filtered += 1;
        }
    }

    let mut inventory = NounInventory::new();
    for (form, counts) in &tagged {
        let majority = counts.map(|_, count| count as f64).best_and_runner_up().0;
        let gold = if counts.values().filter(|&&count| count > 0).count() > 1 {
            GoldGender::Ambiguous(majority)
        } else {
            GoldGender::Known(majority)
        };
        let frequency = frequencies.get(form.as_str()).copied().unwrap_or(0);
        inventory.insert(form, frequency, gold)?;
    }

    let stats = CorpusStats {
        sentences: sentences.len(),
        tokens,
        nouns: inventory.len(),
        noun_occurrences: occurrences.len(),
        signatures_kept: kept.len(),
        signatures_filtered,
    };

    let occurrences = occurrences.into_iter().map(|(noun, signatures)| {
        Occurrence::new(
            noun,
            signatures
                .into_iter()
                .filter(|signature| kept.contains(signature.as_str()))
                .map(|signature| ContextSignature::new(&signature)),
        )
    });
    let index = ContextIndex::build(&inventory, occurrences, options.context_statistics)?;

    log::info!(
        "Loaded {} nouns from {} sentences ({} occurrences, {} signatures kept, {} filtered)",
        stats.nouns,
        stats.sentences,
        stats.noun_occurrences,
        stats.signatures_kept,
        stats.signatures_filtered,
    );

    Ok(Corpus {
        inventory,
        index,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# sent_id = 1
# text = Velký pán spí.
1\tVelký\tvelký\tADJ\tAAMS1----1A----\t_\t2\tamod\t_\t_
2\tpán\tpán\tNOUN\tNNMS1-----A----\t_\t3\tnsubj\t_\t_
3\tspí\tspát\tVERB\tVB-S---3P-AA---\t_\t0\troot\t_\t_
4\t.\t.\tPUNCT\tZ:-------------\t_\t3\tpunct\t_\t_

1-2\tvdomě\t_\t_\t_\t_\t_\t_\t_\t_
1\tv\tv\tADP\tRR--6----------\t_\t2\tcase\t_\t_
2\tdomě\tdům\tNOUN\tNNIS6-----A----\t_\t0\troot\t_\t_
";

    #[test]
    fn test_parse_skips_comments_and_ranges() {
        let sentences = parse_conllu(SAMPLE.as_bytes()).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].len(), 4);
        assert_eq!(sentences[0][1].form, "pán");
        assert_eq!(sentences[0][1].xpos.as_deref(), Some("NNMS1-----A----"));
        let second: Vec<&str> = sentences[1].iter().map(|t| t.form.as_str()).collect();
        assert_eq!(second, ["v", "domě"]);
    }

    #[test]
    fn test_parse_rejects_short_lines() {
        let err = parse_conllu("1\tpán\tpán\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_base_noun_tags() {
        assert_eq!(base_noun_gender("NNMS1-----A----"), Some(Gender::Masculine));
        assert_eq!(base_noun_gender("NNIS1-----A----"), Some(Gender::Masculine));
        assert_eq!(base_noun_gender("NNFS1-----A----"), Some(Gender::Feminine));
        assert_eq!(base_noun_gender("NNNS1-----A----"), Some(Gender::Neuter));
        // plural, wrong case, adjective, unknown gender
        assert_eq!(base_noun_gender("NNFP1-----A----"), None);
        assert_eq!(base_noun_gender("NNFS2-----A----"), None);
        assert_eq!(base_noun_gender("AAFS1----1A----"), None);
        assert_eq!(base_noun_gender("NNXS1-----A----"), None);
        assert_eq!(base_noun_gender("NN"), None);
    }

    fn token(form: &str, xpos: &str) -> Token {
        Token {
            form: form.to_string(),
            xpos: Some(xpos.to_string()),
        }
    }

    #[test]
    fn test_forms_tagged_with_several_genders_are_ambiguous() {
        let sentences = vec![
            vec![token("ta", "PDFS1----------"), token("kočka", "NNFS1-----A----")],
            vec![token("ta", "PDFS1----------"), token("kočka", "NNFS1-----A----")],
            vec![token("ten", "PDYS1----------"), token("kočka", "NNMS1-----A----")],
            vec![token("ta", "PDFS1----------"), token("žena", "NNFS1-----A----")],
        ];
        let corpus = load(&sentences, &CorpusOptions::default()).unwrap();

        let kocka = corpus.inventory.by_base_form("kočka").unwrap();
        assert_eq!(kocka.gold(), GoldGender::Ambiguous(Gender::Feminine));
        assert_eq!(kocka.frequency(), 3);
        let zena = corpus.inventory.by_base_form("žena").unwrap();
        assert_eq!(zena.gold(), GoldGender::Known(Gender::Feminine));
    }

    #[test]
    fn test_suffix_signatures() {
        let signatures =
            context_signatures("ta", "", ContextType::Bilateral, ContextWordForm::Suffix);
        assert_eq!(signatures, ["ta|", "a|", "|"]);

        let signatures = context_signatures("ten", "spí", ContextType::Left, ContextWordForm::Word);
        assert_eq!(signatures, ["ten|"]);

        let signatures =
            context_signatures("ten", "je", ContextType::Right, ContextWordForm::Suffix);
        assert_eq!(signatures, ["|je", "|e", "|"]);
    }
}
