use rustc_hash::FxHashMap;
use unicode_normalization::UnicodeNormalization;

use crate::{Gender, GoldGender, InductionError};

/// Index of a noun in its [`NounInventory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NounId(usize);

impl NounId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which stage produced an induced label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LabelSource {
    Seed,
    Bootstrap { round: usize },
    Morphology,
    Default,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Noun {
    base_form: String,
    frequency: u64,
    gold: GoldGender,
    induced: Option<(Gender, LabelSource)>,
}

impl Noun {
    pub fn base_form(&self) -> &str {
        &self.base_form
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn gold(&self) -> GoldGender {
        self.gold
    }

    /// `None` while the noun is unassigned.
    pub fn induced(&self) -> Option<Gender> {
        self.induced.map(|(gender, _)| gender)
    }

    pub fn label_source(&self) -> Option<LabelSource> {
        self.induced.map(|(_, source)| source)
    }

    /// The last `len` characters of the base form, or the whole form if it is shorter.
    pub fn suffix(&self, len: usize) -> &str {
        suffix_of(&self.base_form, len)
    }
}

/// The last `len` characters of `form`, or all of `form` if it is shorter.
pub fn suffix_of(form: &str, len: usize) -> &str {
    if len == 0 {
        return "";
    }
    let start = form
        .char_indices()
        .rev()
        .nth(len - 1)
        .map_or(0, |(idx, _)| idx);
    &form[start..]
}

/// Lowercases and NFC-normalizes a base form so that lookups agree with insertion.
pub fn normalize_base_form(form: &str) -> String {
    form.trim().nfc().collect::<String>().to_lowercase()
}

/// Every candidate noun with its frequency, gold gender and induced label.
///
/// Labels are monotonic: [`NounInventory::assign`] refuses to overwrite an
/// existing label, so once a stage labels a noun no later stage can change it.
#[derive(Clone, Debug, Default)]
pub struct NounInventory {
    nouns: Vec<Noun>,
    ids: FxHashMap<String, NounId>,
}

impl NounInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        base_form: &str,
        frequency: u64,
        gold: GoldGender,
    ) -> Result<NounId, InductionError> {
        let base_form = normalize_base_form(base_form);
        if base_form.is_empty() {
            return Err(InductionError::InvalidNoun {
                noun: base_form,
                reason: "empty base form".to_string(),
            });
        }
        if frequency == 0 {
            return Err(InductionError::InvalidNoun {
                noun: base_form,
                reason: "frequency must be at least 1".to_string(),
            });
        }
        if self.ids.contains_key(&base_form) {
            return Err(InductionError::DuplicateNoun { noun: base_form });
        }

        let id = NounId(self.nouns.len());
        self.ids.insert(base_form.clone(), id);
        self.nouns.push(Noun {
            base_form,
            frequency,
            gold,
            induced: None,
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.nouns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nouns.is_empty()
    }

    pub fn id_of(&self, base_form: &str) -> Option<NounId> {
        self.ids.get(&normalize_base_form(base_form)).copied()
    }

    pub fn get(&self, id: NounId) -> &Noun {
        &self.nouns[id.0]
    }

    pub fn by_base_form(&self, base_form: &str) -> Option<&Noun> {
        self.id_of(base_form).map(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NounId, &Noun)> {
        self.nouns
            .iter()
            .enumerate()
            .map(|(idx, noun)| (NounId(idx), noun))
    }

    pub fn unassigned(&self) -> impl Iterator<Item = (NounId, &Noun)> {
        self.iter().filter(|(_, noun)| noun.induced.is_none())
    }

    pub fn labeled_count(&self) -> usize {
        self.nouns.iter().filter(|noun| noun.induced.is_some()).count()
    }

    /// Labels an unassigned noun.
    pub fn assign(
        &mut self,
        id: NounId,
        gender: Gender,
        source: LabelSource,
    ) -> Result<(), InductionError> {
        let noun = self
            .nouns
            .get_mut(id.0)
            .ok_or_else(|| InductionError::UnknownNoun {
                noun: format!("#{}", id.0),
            })?;
        if let Some((existing, _)) = noun.induced {
            return Err(InductionError::Relabel {
                noun: noun.base_form.clone(),
                existing,
                attempted: gender,
            });
        }
        noun.induced = Some((gender, source));
        Ok(())
    }

    /// Frozen copy of the current labels.
    pub fn label_view(&self) -> LabelView {
        LabelView {
            labels: self.nouns.iter().map(Noun::induced).collect(),
        }
    }

    /// Final base form → induced gender table, sorted by base form.
    pub fn assignment(&self) -> std::collections::BTreeMap<String, Gender> {
        self.nouns
            .iter()
            .filter_map(|noun| Some((noun.base_form.clone(), noun.induced()?)))
            .collect()
    }
}

/// Labels as they stood when the view was taken. Bootstrapping rounds read
/// only from a view so that decisions within a round never see each other.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelView {
    labels: Vec<Option<Gender>>,
}

impl LabelView {
    pub fn get(&self, id: NounId) -> Option<Gender> {
        self.labels.get(id.0).copied().flatten()
    }

    pub fn labeled(&self) -> impl Iterator<Item = (NounId, Gender)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| Some((NounId(idx), (*label)?)))
    }
}
