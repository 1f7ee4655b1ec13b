use crate::error::Result;
use jieba_rs::Jieba;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Word segmentation capability: free text in, ordered tokens out.
///
/// Implementations must be deterministic and return an empty sequence for
/// empty input.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// NFKC-normalize and lowercase. Folds full-width letters, digits and
/// punctuation (`？`, `！`, `，`) and the ideographic space to ASCII, and
/// maps the ideographic full stop `。` to `.`.
pub fn normalize_text(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase().replace('\u{3002}', ".")
}

/// Default tokenizer: normalization, word extraction, optional stopword
/// removal and optional Snowball stemming.
pub struct TextTokenizer {
    stemmer: Option<Stemmer>,
    remove_stopwords: bool,
}

impl TextTokenizer {
    /// English stemming with stopword removal.
    pub fn english() -> Self { Self { stemmer: Some(Stemmer::create(Algorithm::English)), remove_stopwords: true } }

    /// Normalization and word extraction only; every word is kept verbatim.
    pub fn plain() -> Self { Self { stemmer: None, remove_stopwords: false } }

    pub fn with_stemmer(mut self, algorithm: Algorithm) -> Self {
        self.stemmer = Some(Stemmer::create(algorithm));
        self
    }

    pub fn with_stopwords(mut self, enabled: bool) -> Self {
        self.remove_stopwords = enabled;
        self
    }

    fn is_stopword(&self, token: &str) -> bool { self.remove_stopwords && STOPWORDS.contains(token) }
}

impl Default for TextTokenizer {
    fn default() -> Self { Self::english() }
}

impl Tokenizer for TextTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let normalized = normalize_text(text);
        let mut tokens = Vec::new();
        for mat in RE.find_iter(&normalized) {
            let token = mat.as_str();
            if self.is_stopword(token) { continue; }
            let token = match &self.stemmer {
                Some(stemmer) => stemmer.stem(token).to_string(),
                None => token.to_string(),
            };
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Chinese word segmentation using jieba's search mode, which also emits the
/// shorter words inside long ones (`清华大学` yields `清华`, `大学` and
/// `清华大学`). Text is normalized first; punctuation and whitespace
/// segments are dropped.
pub struct JiebaTokenizer {
    jieba: Jieba,
    hmm: bool,
}

impl JiebaTokenizer {
    /// Loads the bundled dictionary, with HMM discovery of unknown words.
    pub fn new() -> Self { Self { jieba: Jieba::new(), hmm: true } }

    pub fn with_hmm(mut self, enabled: bool) -> Self {
        self.hmm = enabled;
        self
    }
}

impl Default for JiebaTokenizer {
    fn default() -> Self { Self::new() }
}

impl Tokenizer for JiebaTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let normalized = normalize_text(text);
        Ok(self
            .jieba
            .cut_for_search(&normalized, self.hmm)
            .into_iter()
            .filter(|word| word.chars().any(char::is_alphanumeric))
            .map(str::to_string)
            .collect())
    }
}

/// Splits on Unicode whitespace and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}

/// Tokenize a query, expanding inputs the tokenizer cannot split.
///
/// See [`expand_query_tokens`].
pub fn tokenize_for_search(tokenizer: &dyn Tokenizer, input: &str) -> Result<Vec<String>> {
    let tokens = tokenizer.tokenize(input)?;
    expand_query_tokens(tokenizer, input, tokens)
}

/// Expand `tokens`, the tokenization of `input`, when the tokenizer could not
/// split it.
///
/// When at most one token came back for an input of two or more characters,
/// the input minus its last char and the last char are tokenized too and
/// appended, with duplicates removed. The original tokens always come first.
pub fn expand_query_tokens(tokenizer: &dyn Tokenizer, input: &str, tokens: Vec<String>) -> Result<Vec<String>> {
    if tokens.len() > 1 || input.chars().count() < 2 {
        return Ok(tokens);
    }
    let split = match input.char_indices().last() {
        Some((idx, _)) => idx,
        None => return Ok(tokens),
    };

    let mut expanded = tokens;
    for fragment in [&input[..split], &input[split..]] {
        for candidate in tokenizer.tokenize(fragment)? {
            if !expanded.contains(&candidate) {
                expanded.push(candidate);
            }
        }
    }
    Ok(expanded)
}
