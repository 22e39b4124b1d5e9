// landmarks.rs — Known targets that override what the model says.
//
// A matched landmark canonicalises the result name, pins a curated reference
// image, and can add extra facts. Each landmark may also contribute an override
// hint to the recognition prompt.

use serde::{Deserialize, Serialize};

use super::RecognitionResult;

const WHITE_HOUSE_IMAGE: &str =
    "https://images.unsplash.com/photo-1501466044931-62695aada8e9?q=80&w=1200&auto=format&fit=crop";
const DATA_CENTER_IMAGE: &str =
    "https://images.unsplash.com/photo-1558494949-ef010cbdcc51?q=80&w=1200&auto=format&fit=crop";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    /// Canonical display name.
    pub name: String,
    /// Lowercase substrings; any one of them in the model's name is a match.
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
    /// Instruction appended to the recognition prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_facts: Option<String>,
    /// Generate a visual even though a reference image exists.
    #[serde(default)]
    pub always_generate_visual: bool,
}

impl Landmark {
    fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkCatalog {
    landmarks: Vec<Landmark>,
}

impl Default for LandmarkCatalog {
    fn default() -> Self {
        Self::new(vec![
            Landmark {
                name: "White House".into(),
                keywords: vec!["white house".into()],
                reference_image: Some(WHITE_HOUSE_IMAGE.into()),
                prompt_hint: Some(
                    "If target is SILVER/METAL pin: White House (Washington D.C).".into(),
                ),
                weather_facts: None,
                always_generate_visual: false,
            },
            Landmark {
                name: "IAD13 Data Center".into(),
                keywords: vec!["iad13".into(), "data center".into()],
                reference_image: Some(DATA_CENTER_IMAGE.into()),
                prompt_hint: Some(
                    "If target is CLEAR/GLASS pin: IAD13 Data Center (Ashburn Virginia).".into(),
                ),
                weather_facts: Some(
                    "Blizzard of 2016 (\"Jonas\"): 36 inches of snow.\nExtreme Heat 2024: 104°F recorded."
                        .into(),
                ),
                always_generate_visual: true,
            },
        ])
    }
}

impl LandmarkCatalog {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// First landmark whose keywords match `name`.
    pub fn lookup(&self, name: &str) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.matches(name))
    }

    /// Numbered override lines for the recognition prompt, or `None` when no
    /// landmark carries a hint.
    pub fn prompt_overrides(&self) -> Option<String> {
        let hints: Vec<String> = self
            .landmarks
            .iter()
            .filter_map(|l| l.prompt_hint.as_deref())
            .enumerate()
            .map(|(i, hint)| format!("{}. {}", i + 1, hint))
            .collect();
        if hints.is_empty() {
            None
        } else {
            Some(hints.join("\n"))
        }
    }

    /// Rewrite `result` in place if it names a known landmark.
    /// Returns whether a landmark matched.
    pub fn apply(&self, result: &mut RecognitionResult) -> bool {
        let Some(landmark) = self.lookup(&result.name) else {
            return false;
        };
        result.name = landmark.name.clone();
        if let Some(url) = &landmark.reference_image {
            result.reference_image = Some(url.clone());
        }
        if let Some(facts) = &landmark.weather_facts {
            result.weather_facts = Some(facts.clone());
        }
        true
    }

    /// Whether a result should get a synthesized visual: always when it has no
    /// reference image, otherwise only if its landmark asks for one.
    pub fn wants_visual(&self, result: &RecognitionResult) -> bool {
        if result.reference_image.is_none() {
            return true;
        }
        self.lookup(&result.name)
            .map(|l| l.always_generate_visual)
            .unwrap_or(false)
    }
}
