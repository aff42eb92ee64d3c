/// User preferences persisted by the popup: intensity, detection modules and word lists
use serde::{Deserialize, Serialize};

/// How aggressively the moderation service should act, 1 (observe) to 5 (maximum protection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Clamp into the supported range
    pub fn new(level: u8) -> Intensity {
        Intensity(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn title(self) -> &'static str {
        match self.0 {
            1 => "관찰",
            2 => "관대함",
            4 => "적극",
            5 => "최대 보호",
            _ => "일반 (권장)",
        }
    }

    pub fn description(self) -> &'static str {
        match self.0 {
            1 => "최소한의 개입으로, 명백한 욕설만 마스킹 처리하여 로그를 기록합니다.",
            2 => "블랙리스트 및 확실한 악성 댓글만 '숨김' 처리하고, AI 탐지 댓글은 조치하지 않습니다.",
            4 => "AI를 신뢰하여 악성으로 판단된 대부분의 댓글을 즉시 '숨김' 처리합니다. (오탐 가능성 있음)",
            5 => "모든 잠재적 악성 댓글을 '숨김' 처리하고 강력하게 차단합니다. (높은 오탐 가능성)",
            _ => "확실한 악성은 즉시 숨기고, AI 탐지 댓글은 관리자 검토 대기로 분류합니다.",
        }
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity(3)
    }
}

impl From<u8> for Intensity {
    fn from(level: u8) -> Self {
        Intensity::new(level)
    }
}

impl From<Intensity> for u8 {
    fn from(intensity: Intensity) -> Self {
        intensity.0
    }
}

/// Detection categories the service can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Criticism,
    Conflict,
    Gaslighting,
    Sexual,
    Relevance,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Criticism,
        ModuleKind::Conflict,
        ModuleKind::Gaslighting,
        ModuleKind::Sexual,
        ModuleKind::Relevance,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ModuleKind::Criticism => "criticism",
            ModuleKind::Conflict => "conflict",
            ModuleKind::Gaslighting => "gaslighting",
            ModuleKind::Sexual => "sexual",
            ModuleKind::Relevance => "relevance",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Criticism => "유튜버 대상 비난",
            ModuleKind::Conflict => "갈등 조장/어그로",
            ModuleKind::Gaslighting => "신뢰도 저하/가스라이팅",
            ModuleKind::Sexual => "성희롱/선정적 괴롭힘",
            ModuleKind::Relevance => "주제 연관성 및 비판 분석",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ModuleKind::Criticism => "영상 내용과 무관한 인신공격을 탐지합니다.",
            ModuleKind::Conflict => "팬덤, 성별, 세대 간 갈등을 유발하는 댓글을 식별합니다.",
            ModuleKind::Gaslighting => "'조작', '거짓말' 등의 키워드를 사용하거나 냉소적인 어조로 크리에이터의 전문성이나 진정성에 의혹을 심는 댓글을 탐지합니다.",
            ModuleKind::Sexual => "신체 부위나 의상을 언급하며 성적 불쾌감을 유발하거나 선정적인 언어를 사용한 괴롭힘 댓글을 탐지합니다.",
            ModuleKind::Relevance => "댓글 내용이 영상 주제와 얼마나 관련 있는지 분석하고, 악의적인 '비난'인지 '건전한 비판'인지 문맥적으로 분류합니다.",
        }
    }
}

/// Enabled flag for every detection module; all five keys are always present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modules {
    pub criticism: bool,
    pub conflict: bool,
    pub gaslighting: bool,
    pub sexual: bool,
    pub relevance: bool,
}

impl Modules {
    pub fn is_enabled(&self, kind: ModuleKind) -> bool {
        match kind {
            ModuleKind::Criticism => self.criticism,
            ModuleKind::Conflict => self.conflict,
            ModuleKind::Gaslighting => self.gaslighting,
            ModuleKind::Sexual => self.sexual,
            ModuleKind::Relevance => self.relevance,
        }
    }

    pub fn toggled(mut self, kind: ModuleKind) -> Modules {
        let flag = match kind {
            ModuleKind::Criticism => &mut self.criticism,
            ModuleKind::Conflict => &mut self.conflict,
            ModuleKind::Gaslighting => &mut self.gaslighting,
            ModuleKind::Sexual => &mut self.sexual,
            ModuleKind::Relevance => &mut self.relevance,
        };
        *flag = !*flag;
        self
    }
}

impl Default for Modules {
    fn default() -> Self {
        Modules {
            criticism: true,
            conflict: true,
            gaslighting: false,
            sexual: true,
            relevance: false,
        }
    }
}

/// Ordered set of words: no duplicates, insertion order kept for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct WordList(Vec<String>);

impl WordList {
    pub fn new() -> Self {
        WordList(Vec::new())
    }

    /// Normalize a user-typed word: trimmed, with commas stripped
    pub fn normalize(raw: &str) -> String {
        raw.trim().replace(',', "")
    }

    /// Add a word after normalizing it. Returns false for empty or duplicate words.
    pub fn insert(&mut self, raw: &str) -> bool {
        let word = Self::normalize(raw);
        if word.is_empty() || self.contains(&word) {
            return false;
        }
        self.0.push(word);
        true
    }

    pub fn remove(&mut self, word: &str) -> bool {
        let original_len = self.0.len();
        self.0.retain(|w| w != word);
        self.0.len() < original_len
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.iter().any(|w| w == word)
    }

    /// True if any listed word occurs as a substring of `text`
    pub fn matches_text(&self, text: &str) -> bool {
        self.0.iter().any(|w| text.contains(w.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for WordList {
    fn from(words: Vec<String>) -> Self {
        let mut list = WordList::new();
        for word in words {
            if !list.contains(&word) {
                list.0.push(word);
            }
        }
        list
    }
}

impl From<WordList> for Vec<String> {
    fn from(list: WordList) -> Self {
        list.0
    }
}

impl<'a> FromIterator<&'a str> for WordList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect::<Vec<_>>().into()
    }
}

/// The single persisted settings object. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub intensity: Intensity,
    pub modules: Modules,
    pub white_list: WordList,
    pub black_list: WordList,
}

impl Settings {
    pub fn with_intensity(&self, level: u8) -> Settings {
        Settings {
            intensity: Intensity::new(level),
            ..self.clone()
        }
    }

    pub fn with_module_toggled(&self, kind: ModuleKind) -> Settings {
        Settings {
            modules: self.modules.toggled(kind),
            ..self.clone()
        }
    }

    pub fn with_white_list(&self, white_list: WordList) -> Settings {
        Settings {
            white_list,
            ..self.clone()
        }
    }

    pub fn with_black_list(&self, black_list: WordList) -> Settings {
        Settings {
            black_list,
            ..self.clone()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            intensity: Intensity::default(),
            modules: Modules::default(),
            white_list: ["바보", "멍청이"].into_iter().collect(),
            black_list: ["비하 별명", "경쟁 채널"].into_iter().collect(),
        }
    }
}
