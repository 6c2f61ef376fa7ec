//! Provider identifiers.

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Ollama,
    Gemini,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Gemini => "gemini",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Gemini)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("ollama"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("Gemini"), Some(ProviderType::Gemini));
        assert_eq!(ProviderType::parse("google"), Some(ProviderType::Gemini));
        assert_eq!(ProviderType::parse("openai"), None);
    }

    #[test]
    fn test_as_str_round_trips() {
        for provider in [ProviderType::Ollama, ProviderType::Gemini] {
            assert_eq!(ProviderType::parse(provider.as_str()), Some(provider));
        }
    }
}
