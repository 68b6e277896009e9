use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Translation targets, TTS voices and feed metadata all speak in short
/// ISO 639-1 codes ("es", "en"), while detection and some source services
/// hand back 3-letter codes. This module normalizes between the two and
/// detects the dominant language of an article body.
/// Number of leading characters sampled for language detection
pub const DETECTION_SAMPLE_CHARS: usize = 1000;

/// Map an ISO 639-2/B code to its 639-2/T equivalent where the two differ
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    let mapped = match code {
        "fre" => "fra", // French
        "ger" => "deu", // German
        "dut" => "nld", // Dutch
        "gre" => "ell", // Greek
        "chi" => "zho", // Chinese
        "cze" => "ces", // Czech
        "ice" => "isl", // Icelandic
        "alb" => "sqi", // Albanian
        "arm" => "hye", // Armenian
        "baq" => "eus", // Basque
        "bur" => "mya", // Burmese
        "per" => "fas", // Persian
        "geo" => "kat", // Georgian
        "may" => "msa", // Malay
        "mac" => "mkd", // Macedonian
        "rum" => "ron", // Romanian
        "slo" => "slk", // Slovak
        "wel" => "cym", // Welsh
        _ => return None,
    };
    Some(mapped)
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    // If it's a 2-letter code, convert to 3-letter
    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    }
    // If it's already a 3-letter code, ensure it's ISO 639-2/T
    else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }

        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;

    if let Some(lang) = Language::from_639_3(&part2t) {
        if let Some(code_639_1) = lang.to_639_1() {
            return Ok(code_639_1.to_string());
        }

        // If no ISO 639-1 code exists, return the ISO 639-2/T code
        return Ok(part2t);
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let normalized1 = match normalize_to_part2t(code1) {
        Ok(n) => n,
        Err(_) => return false,
    };

    let normalized2 = match normalize_to_part2t(code2) {
        Ok(n) => n,
        Err(_) => return false,
    };

    normalized1 == normalized2
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Detect the dominant language of a text body
///
/// Only the first `DETECTION_SAMPLE_CHARS` characters are sampled; article
/// bodies are long and the tail adds nothing to detection confidence.
/// Returns the ISO 639-1 short code where one exists (639-2/T otherwise),
/// or None when detection is inconclusive.
pub fn detect_language(text: &str) -> Option<String> {
    let sample: String = text.chars().take(DETECTION_SAMPLE_CHARS).collect();
    if sample.trim().is_empty() {
        return None;
    }

    let info = whatlang::detect(&sample)?;
    if !info.is_reliable() {
        return None;
    }

    normalize_to_part1_or_part2t(info.lang().code()).ok()
}
