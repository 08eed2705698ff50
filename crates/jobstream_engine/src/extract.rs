use scraper::{Html, Selector};

/// Structural locators for the job-description fragment, most specific
/// first. Order is significant: the first selector yielding non-empty
/// trimmed text wins.
pub const JOB_DESCRIPTION_SELECTORS: [&str; 4] = [
    ".show-more-less-html__markup",
    ".job-description",
    "#job-details",
    ".description__text",
];

pub trait Extractor: Send + Sync {
    /// Extract the target text from raw markup. `None` means no locator
    /// matched; given how often the markup varies, absence is a normal
    /// outcome, not an error.
    fn extract(&self, html: &str) -> Option<String>;
}

/// Prioritized selector search over a document parsed once.
///
/// For each selector, the visible text of all matches is concatenated and
/// trimmed; the first non-empty result is returned.
#[derive(Debug)]
pub struct SelectorListExtractor {
    selectors: Vec<Selector>,
}

impl SelectorListExtractor {
    /// Build from raw CSS selectors, skipping any that fail to parse.
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Self {
        Self {
            selectors: selectors
                .iter()
                .filter_map(|raw| Selector::parse(raw.as_ref()).ok())
                .collect(),
        }
    }

    /// The extractor for LinkedIn job postings.
    pub fn job_description() -> Self {
        Self::new(&JOB_DESCRIPTION_SELECTORS)
    }
}

impl Extractor for SelectorListExtractor {
    fn extract(&self, html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        for selector in &self.selectors {
            let text = doc
                .select(selector)
                .flat_map(|node| node.text())
                .collect::<String>();
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
        None
    }
}
