//! Text segmentation into paragraphs, sentences, and words.
//!
//! Post-processing for extracted text: paragraphs split on blank lines,
//! sentences split on terminators with quoted spans protected and common
//! abbreviations left intact, words tokenized with contractions preserved.
//! Table-of-contents paragraphs are detected heuristically and split by
//! line instead of by sentence.

use regex::Regex;
use std::sync::OnceLock;

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: [&str; 11] = [
    "Dr.", "Mr.", "Ms.", "Mrs.", "St.", "etc.", "e.g.", "i.e.", "vs.", "p.m.", "a.m.",
];

/// Words that mark a paragraph as front-matter rather than body text.
const TOC_KEYWORDS: [&str; 6] = ["contents", "page", "act", "scene", "prologue", "chapter"];

/// A paragraph with its sentence segmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// Whether this paragraph looks like a table-of-contents entry
    pub is_toc: bool,
    /// The paragraph's sentences (or lines, for TOC paragraphs)
    pub sentences: Vec<String>,
}

/// Grammar-driven text segmenter
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParser;

impl TextParser {
    /// Create a new text parser
    pub fn new() -> Self {
        Self
    }

    /// Normalize line endings and punctuation before segmentation.
    ///
    /// CRLF/CR become LF, hard-wrapped single newlines become spaces
    /// (paragraph breaks survive), curly quotes become their ASCII
    /// equivalents, and a leading BOM is dropped.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let text = text
            .replace('\u{2018}', "'")
            .replace('\u{2019}', "'")
            .replace('\u{201C}', "\"")
            .replace('\u{201D}', "\"");
        let text = unwrap_single_newlines(&text);
        text.trim_start_matches('\u{feff}').to_string()
    }

    /// Split text into paragraphs on runs of two or more newlines.
    pub fn paragraphs(&self, text: &str) -> Vec<String> {
        paragraph_re()
            .split(text)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Heuristic: does this paragraph look like a table-of-contents entry?
    pub fn is_toc(&self, paragraph: &str) -> bool {
        let words: Vec<&str> = paragraph.split_whitespace().collect();

        // Short shouty lines are headings
        if words.len() < 5
            && paragraph.chars().any(|c| c.is_uppercase())
            && !paragraph.chars().any(|c| c.is_lowercase())
        {
            return true;
        }

        if words
            .iter()
            .any(|w| TOC_KEYWORDS.contains(&w.to_lowercase().as_str()))
        {
            return true;
        }

        // "CHAPTER X." style
        if chapter_re().is_match(paragraph) {
            return true;
        }

        // "Something 10" / "Something iv" page lines
        page_re().is_match(paragraph)
    }

    /// Split a paragraph into sentences.
    ///
    /// Quoted spans are masked first so terminators inside them never
    /// split, and a terminator that closes a known abbreviation is
    /// ignored. TOC paragraphs split by line instead.
    pub fn sentences(&self, paragraph: &str) -> Vec<String> {
        if self.is_toc(paragraph) {
            return paragraph
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
        }

        let (masked, quotes) = mask_quotes(paragraph);

        let mut sentences = Vec::new();
        let mut start = 0;
        for m in terminator_re().find_iter(&masked) {
            // terminators are single ASCII chars, so +1 is safe
            let through_punct = &masked[..m.start() + 1];
            if through_punct.ends_with('.') && ends_with_abbreviation(through_punct) {
                continue;
            }
            let sentence = masked[start..m.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = m.end();
        }
        if start < masked.len() {
            let rest = masked[start..].trim();
            if !rest.is_empty() {
                sentences.push(rest.to_string());
            }
        }

        unmask_quotes(sentences, &quotes)
    }

    /// Tokenize a sentence into words, numbers, and punctuation runs.
    /// Contractions stay whole.
    pub fn words(&self, sentence: &str) -> Vec<String> {
        word_re()
            .find_iter(sentence)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Break text down into paragraphs and their sentences.
    pub fn parse(&self, text: &str) -> Vec<Paragraph> {
        self.paragraphs(text)
            .iter()
            .map(|p| Paragraph {
                is_toc: self.is_toc(p),
                sentences: self.sentences(p),
            })
            .collect()
    }
}

/// Replace quoted spans with `__QUOTE_<i>__` placeholders.
fn mask_quotes(text: &str) -> (String, Vec<String>) {
    let mut quotes = Vec::new();
    let masked = quote_re()
        .replace_all(text, |caps: &regex::Captures| {
            quotes.push(caps[0].to_string());
            format!("__QUOTE_{}__", quotes.len() - 1)
        })
        .into_owned();
    (masked, quotes)
}

/// Restore quote placeholders to their original spans.
fn unmask_quotes(sentences: Vec<String>, quotes: &[String]) -> Vec<String> {
    sentences
        .into_iter()
        .map(|mut s| {
            for (i, quote) in quotes.iter().enumerate() {
                s = s.replace(&format!("__QUOTE_{i}__"), quote);
            }
            s
        })
        .collect()
}

/// Does the text end with a known abbreviation (at a word boundary)?
fn ends_with_abbreviation(text: &str) -> bool {
    ABBREVIATIONS.iter().any(|abbr| {
        text.ends_with(abbr) && {
            let prefix = &text[..text.len() - abbr.len()];
            prefix
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric())
        }
    })
}

/// Replace hard-wrap newlines with spaces; newlines that touch another
/// newline (paragraph breaks) stay put.
fn unwrap_single_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut prev: Option<char> = None;
    while let Some(c) = chars.next() {
        if c == '\n' && prev != Some('\n') && chars.peek() != Some(&'\n') {
            out.push(' ');
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").unwrap())
}

fn terminator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?](\s+|$)").unwrap())
}

fn quote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""[^"]*""#).unwrap())
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+(?:'\w+)?|[[:punct:]]+").unwrap())
}

fn chapter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*CHAPTER\s+[IVXLCDM\d]+\.?$").unwrap())
}

fn page_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\S+\s+(\d+|[ivxlcdm]+)\s*$").unwrap())
}
