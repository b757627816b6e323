use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker put in front of a caption that was flagged as a non-answer.
pub const FALLBACK_MARKER: &str = "[FALLBACK] ";

/// Phrases the model uses when it declines to answer or asks for the image.
/// Compared lower-cased, so the casing here does not matter.
const ENGLISH_FALLBACK_PHRASES: &[&str] = &[
    "i'm sorry",
    "i cannot",
    "can't see the image",
    "I'm",
    "I am",
    "GPT-4",
    "could you describe",
    "unable to see",
    "i am not able",
    "I'm unable",
    "no image provided",
    "image not available",
    "i can't access",
    "Certainly!",
    "provide the image",
];

const SPANISH_FALLBACK_PHRASES: &[&str] = &[
    "lo siento",
    "no puedo ver la imagen",
    "no puedo",
    "descríbela para que pueda ayudarte",
    "necesito la imagen o que me la describas",
    "no se proporcionó imagen",
    "no tengo acceso a la imagen",
    "soy un modelo de lenguaje de ia y no puedo ver imágenes",
    "no se pudo generar una descripción válida.",
    "claro, aquí tienes una descripción adecuada",
];

/// Language the captions are expected in. Each language has its own phrase list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
}

impl Language {
    #[must_use]
    pub const fn fallback_phrases(self) -> &'static [&'static str] {
        match self {
            Self::English => ENGLISH_FALLBACK_PHRASES,
            Self::Spanish => SPANISH_FALLBACK_PHRASES,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => write!(f, "english"),
            Self::Spanish => write!(f, "spanish"),
        }
    }
}

/// Check if the model response is a fallback (non-visual) response.
///
/// Empty captions always count as fallback. Otherwise this is plain substring
/// containment, case-insensitive, against the phrase list of `language`. A real
/// caption that happens to contain one of the phrases is flagged too.
#[must_use]
pub fn is_fallback_caption(caption: &str, language: Language) -> bool {
    if caption.trim().is_empty() {
        return true;
    }
    let caption_lower = caption.to_lowercase();
    language
        .fallback_phrases()
        .iter()
        .any(|phrase| caption_lower.contains(&phrase.to_lowercase()))
}

/// Prefix the caption with [`FALLBACK_MARKER`] if it is flagged as fallback.
#[must_use]
pub fn mark_fallback(caption: String, language: Language) -> String {
    if is_fallback_caption(&caption, language) {
        format!("{FALLBACK_MARKER}{caption}")
    } else {
        caption
    }
}
