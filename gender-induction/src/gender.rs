use enumap::EnuMap;

/// Grammatical gender of a noun.
///
/// Gender is a lexical feature of nouns; adjectives, determiners, pronouns and
/// verbs agree with it. Languages with an animate/inanimate split inside the
/// masculine (Czech, Polish) collapse both into [`Gender::Masculine`] here.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnuMap,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Gender {
    #[serde(rename = "MASC")]
    Masculine,
    #[serde(rename = "FEM")]
    Feminine,
    #[serde(rename = "NEUT")]
    Neuter,
}

impl Gender {
    pub const ALL: [Gender; 3] = GenderMap::<()>::KEYS;
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
            Gender::Neuter => "neuter",
        };
        write!(f, "{word}")
    }
}

/// Reference gender taken from corpus annotation. Only the evaluator and the
/// gold seed annotator read it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GoldGender {
    Known(Gender),
    /// Tagged with more than one gender; holds the most frequent tag.
    Ambiguous(Gender),
    Unknown,
}

impl GoldGender {
    /// Reference gender for evaluation, the majority tag for ambiguous forms.
    pub fn known(self) -> Option<Gender> {
        match self {
            GoldGender::Known(gender) | GoldGender::Ambiguous(gender) => Some(gender),
            GoldGender::Unknown => None,
        }
    }

    /// The gender only when every annotation agreed on it.
    pub fn unambiguous(self) -> Option<Gender> {
        match self {
            GoldGender::Known(gender) => Some(gender),
            GoldGender::Ambiguous(_) | GoldGender::Unknown => None,
        }
    }
}

impl From<Option<Gender>> for GoldGender {
    fn from(gender: Option<Gender>) -> Self {
        gender.map_or(GoldGender::Unknown, GoldGender::Known)
    }
}

impl GenderMap<f64> {
    /// The highest-valued gender and the runner-up's value.
    ///
    /// Ties keep the gender declared first, so the result is deterministic.
    pub fn best_and_runner_up(&self) -> (Gender, f64, f64) {
        let mut best = (Gender::ALL[0], f64::NEG_INFINITY);
        let mut runner_up = f64::NEG_INFINITY;
        for (gender, &value) in self.iter() {
            if value > best.1 {
                runner_up = best.1;
                best = (gender, value);
            } else if value > runner_up {
                runner_up = value;
            }
        }
        (best.0, best.1, runner_up.max(0.0))
    }

    /// Scales the values to sum to one. An all-zero map is left untouched.
    pub fn normalized(self) -> Self {
        let total: f64 = self.values().sum();
        if total == 0.0 {
            return self;
        }
        self.map(|_, value| value / total)
    }
}
