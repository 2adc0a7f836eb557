use rustc_hash::FxHashMap;

use crate::{InductionError, NounId, NounInventory};

/// A normalized agreement cue seen next to a noun, e.g. the ending of a
/// preceding adjective.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ContextSignature(String);

impl ContextSignature {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContextSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One occurrence of a noun together with the signatures observed around it.
#[derive(Clone, Debug, PartialEq)]
pub struct Occurrence {
    pub noun: String,
    pub signatures: Vec<ContextSignature>,
}

impl Occurrence {
    pub fn new(noun: impl Into<String>, signatures: impl IntoIterator<Item = ContextSignature>) -> Self {
        Self {
            noun: noun.into(),
            signatures: signatures.into_iter().collect(),
        }
    }
}

/// How repeated (signature, noun) co-occurrences are counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ContextStatistics {
    /// Every co-occurrence adds one.
    Token,
    /// A (signature, noun) pair counts once however often it is seen.
    Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignatureId(usize);

impl SignatureId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Bidirectional co-occurrence counts between nouns and context signatures.
///
/// Every signature present in the occurrence stream is kept; no frequency
/// threshold is applied here.
#[derive(Clone, Debug)]
pub struct ContextIndex {
    signatures: Vec<ContextSignature>,
    signature_ids: FxHashMap<ContextSignature, SignatureId>,
    by_signature: Vec<FxHashMap<NounId, u64>>,
    totals: Vec<u64>,
    by_noun: Vec<FxHashMap<SignatureId, u64>>,
}

impl ContextIndex {
    /// Indexes `occurrences` against `inventory`.
    ///
    /// An occurrence of a noun the inventory does not know is a data integrity
    /// fault and aborts the whole build.
    pub fn build(
        inventory: &NounInventory,
        occurrences: impl IntoIterator<Item = Occurrence>,
        statistics: ContextStatistics,
    ) -> Result<Self, InductionError> {
        let mut index = Self {
            signatures: Vec::new(),
            signature_ids: FxHashMap::default(),
            by_signature: Vec::new(),
            totals: Vec::new(),
            by_noun: vec![FxHashMap::default(); inventory.len()],
        };

        for occurrence in occurrences {
            let noun = inventory
                .id_of(&occurrence.noun)
                .ok_or_else(|| InductionError::DataIntegrity {
                    noun: occurrence.noun.clone(),
                })?;

            let mut seen_here: Vec<SignatureId> = Vec::with_capacity(occurrence.signatures.len());
            for signature in occurrence.signatures {
                let signature = index.intern(signature);
                if seen_here.contains(&signature) {
                    continue;
                }
                seen_here.push(signature);
                index.add(signature, noun, statistics);
            }
        }

        log::debug!(
            "Indexed {} context signatures for {} nouns",
            index.signatures.len(),
            inventory.len()
        );

        Ok(index)
    }

    fn intern(&mut self, signature: ContextSignature) -> SignatureId {
        if let Some(&id) = self.signature_ids.get(&signature) {
            return id;
        }
        let id = SignatureId(self.signatures.len());
        self.signature_ids.insert(signature.clone(), id);
        self.signatures.push(signature);
        self.by_signature.push(FxHashMap::default());
        self.totals.push(0);
        id
    }

    fn add(&mut self, signature: SignatureId, noun: NounId, statistics: ContextStatistics) {
        let count = self.by_signature[signature.0].entry(noun).or_insert(0);
        let added = match statistics {
            ContextStatistics::Token => 1,
            ContextStatistics::Type if *count == 0 => 1,
            ContextStatistics::Type => 0,
        };
        *count += added;
        self.totals[signature.0] += added;
        *self.by_noun[noun.index()].entry(signature).or_insert(0) += added;
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    pub fn signature(&self, id: SignatureId) -> &ContextSignature {
        &self.signatures[id.0]
    }

    pub fn signature_id(&self, signature: &ContextSignature) -> Option<SignatureId> {
        self.signature_ids.get(signature).copied()
    }

    pub fn signature_ids(&self) -> impl Iterator<Item = SignatureId> {
        (0..self.signatures.len()).map(SignatureId)
    }

    /// Nouns co-occurring with `signature` and their counts.
    pub fn nouns_of(&self, signature: SignatureId) -> &FxHashMap<NounId, u64> {
        &self.by_signature[signature.0]
    }

    /// Total co-occurrence count of `signature` over all nouns.
    pub fn signature_total(&self, signature: SignatureId) -> u64 {
        self.totals[signature.0]
    }

    /// Signatures co-occurring with `noun` and their counts. Empty for nouns
    /// added to the inventory after the index was built.
    pub fn signatures_of(&self, noun: NounId) -> impl Iterator<Item = (SignatureId, u64)> + '_ {
        self.by_noun
            .get(noun.index())
            .into_iter()
            .flat_map(|signatures| signatures.iter().map(|(&id, &count)| (id, count)))
    }

    /// Number of distinct signatures co-occurring with `noun`.
    pub fn breadth(&self, noun: NounId) -> usize {
        self.by_noun.get(noun.index()).map_or(0, FxHashMap::len)
    }

    /// Sum of all co-occurrence counts of `noun`.
    pub fn noun_total(&self, noun: NounId) -> u64 {
        self.signatures_of(noun).map(|(_, count)| count).sum()
    }
}
