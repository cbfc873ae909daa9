//! Strategy chains.
//!
//! Every field is extracted by an ordered list of named, independent
//! strategies. [`run_chain`] invokes them in order and keeps the first
//! candidate that survives validation. Strategy errors and panics never
//! escape: they are logged and treated as "no candidate".

use std::cell::{Cell, OnceCell};
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::candidate::Candidate;
use crate::document::FetchedDocument;
use crate::escalation::Escalator;
use crate::error::Result;
use crate::json_ld::JsonLd;
use crate::lexicon::Lexicon;
use crate::meta::MetaTags;
use crate::options::Options;
use crate::result::{Field, NONE_SUCCESSFUL};
use crate::sites::SiteRegistry;
use crate::url_utils::SourceUrl;
use crate::validators::is_sentinel;

/// Signature shared by every strategy.
pub type StrategyFn = fn(&ExtractionContext<'_>) -> Result<Option<Candidate>>;

/// A named extraction attempt.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: StrategyFn,
}

impl Strategy {
    #[must_use]
    pub const fn new(name: &'static str, run: StrategyFn) -> Self {
        Self { name, run }
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Strategy").field(&self.name).finish()
    }
}

/// Everything a strategy may read. Parsed views are built on first use.
pub struct ExtractionContext<'a> {
    pub doc: &'a FetchedDocument,
    pub source: &'a SourceUrl,
    pub lexicon: &'a Lexicon,
    pub options: &'a Options,
    pub sites: &'a SiteRegistry,
    escalator: Option<&'a Escalator>,
    meta: OnceCell<MetaTags>,
    json_ld: OnceCell<JsonLd>,
    rendered: OnceCell<Option<FetchedDocument>>,
    escalated: Cell<bool>,
}

impl<'a> ExtractionContext<'a> {
    #[must_use]
    pub fn new(
        doc: &'a FetchedDocument,
        source: &'a SourceUrl,
        lexicon: &'a Lexicon,
        options: &'a Options,
        sites: &'a SiteRegistry,
    ) -> Self {
        Self {
            doc,
            source,
            lexicon,
            options,
            sites,
            escalator: None,
            meta: OnceCell::new(),
            json_ld: OnceCell::new(),
            rendered: OnceCell::new(),
            escalated: Cell::new(false),
        }
    }

    #[must_use]
    pub fn with_escalator(mut self, escalator: Option<&'a Escalator>) -> Self {
        self.escalator = escalator;
        self
    }

    /// Meta tags of the static document.
    pub fn meta(&self) -> &MetaTags {
        self.meta.get_or_init(|| MetaTags::collect(self.doc.dom()))
    }

    /// JSON-LD objects of the static document.
    pub fn json_ld(&self) -> &JsonLd {
        self.json_ld.get_or_init(|| JsonLd::collect(self.doc.dom()))
    }

    /// Host of the source URL, without `www.`.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.source.host()
    }

    /// Whether a rendered document was consulted during this run.
    #[must_use]
    pub fn escalated(&self) -> bool {
        self.escalated.get()
    }

    /// The rendered document, obtained at most once per run.
    ///
    /// Caller-supplied rendered markup is used for any domain. Otherwise a
    /// live render is attempted only for domains registered as needing one,
    /// and only when escalation is enabled and an escalator is configured.
    /// A failed render is logged and yields `None`.
    pub fn rendered_document(&self) -> Option<&FetchedDocument> {
        let rendered = self
            .rendered
            .get_or_init(|| {
                if let Some(html) = self.doc.rendered_html() {
                    tracing::debug!("using caller-supplied rendered markup");
                    return Some(FetchedDocument::parse(html));
                }

                if !self.options.escalation_enabled || !self.sites.requires_rendering(self.host()) {
                    return None;
                }
                let escalator = self.escalator?;

                match escalator.render(self.source.as_str()) {
                    Ok(doc) => {
                        tracing::info!(url = self.source.as_str(), "rendered DOM obtained");
                        Some(doc)
                    }
                    Err(err) => {
                        tracing::warn!(url = self.source.as_str(), error = %err, "escalation failed");
                        None
                    }
                }
            })
            .as_ref();

        if rendered.is_some() {
            self.escalated.set(true);
        }
        rendered
    }
}

/// Winning candidate of a chain and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    pub candidate: Option<Candidate>,
    pub strategy: &'static str,
}

impl ChainOutcome {
    fn exhausted() -> Self {
        Self {
            candidate: None,
            strategy: NONE_SUCCESSFUL,
        }
    }

    /// Trimmed winning value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.candidate.as_ref().map(Candidate::trimmed)
    }
}

/// Run `strategies` in order and return the first accepted candidate.
///
/// A candidate is accepted when its trimmed value is non-empty, is not a
/// sentinel placeholder and passes `accept`.
pub fn run_chain(
    field: Field,
    strategies: &[Strategy],
    ctx: &ExtractionContext<'_>,
    accept: impl Fn(&Candidate) -> bool,
) -> ChainOutcome {
    for strategy in strategies {
        let attempt = catch_unwind(AssertUnwindSafe(|| (strategy.run)(ctx)));

        let candidate = match attempt {
            Ok(Ok(Some(candidate))) => candidate,
            Ok(Ok(None)) => continue,
            Ok(Err(err)) => {
                tracing::debug!(%field, strategy = strategy.name, error = %err, "strategy failed");
                continue;
            }
            Err(_) => {
                tracing::debug!(%field, strategy = strategy.name, "strategy panicked");
                continue;
            }
        };

        let value = candidate.trimmed();
        if value.is_empty() || is_sentinel(value) {
            continue;
        }
        if !accept(&candidate) {
            tracing::debug!(%field, strategy = strategy.name, value, "candidate rejected");
            continue;
        }

        tracing::debug!(%field, strategy = strategy.name, "strategy succeeded");
        return ChainOutcome {
            candidate: Some(candidate),
            strategy: strategy.name,
        };
    }

    tracing::debug!(%field, "chain exhausted");
    ChainOutcome::exhausted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn fails(_: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
        Err(Error::strategy("fails", "boom"))
    }

    fn panics(_: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
        panic!("strategy bug")
    }

    fn nothing(_: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
        Ok(None)
    }

    fn sentinel(_: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
        Ok(Some(Candidate::text("Brand not found", "sentinel")))
    }

    fn short(_: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
        Ok(Some(Candidate::text("x", "short")))
    }

    fn good(_: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
        Ok(Some(Candidate::meta("  Orijen ", "good")))
    }

    fn later(_: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
        Ok(Some(Candidate::meta("Acana", "later")))
    }

    fn with_ctx(f: impl FnOnce(&ExtractionContext<'_>)) {
        let doc = FetchedDocument::parse("<html><body></body></html>");
        let source = SourceUrl::new("https://example.com/p/1");
        let options = Options::default();
        let sites = SiteRegistry::empty();
        let ctx = ExtractionContext::new(&doc, &source, Lexicon::builtin(), &options, &sites);
        f(&ctx);
    }

    #[test]
    fn first_accepted_candidate_wins() {
        with_ctx(|ctx| {
            let strategies = [
                Strategy::new("fails", fails),
                Strategy::new("panics", panics),
                Strategy::new("nothing", nothing),
                Strategy::new("sentinel", sentinel),
                Strategy::new("short", short),
                Strategy::new("good", good),
                Strategy::new("later", later),
            ];
            let outcome = run_chain(Field::Brand, &strategies, ctx, |c| c.trimmed().len() > 1);
            assert_eq!(outcome.strategy, "good");
            assert_eq!(outcome.value(), Some("Orijen"));
        });
    }

    #[test]
    fn exhaustion_reports_none_successful() {
        with_ctx(|ctx| {
            let strategies = [Strategy::new("fails", fails), Strategy::new("nothing", nothing)];
            let outcome = run_chain(Field::Image, &strategies, ctx, |_| true);
            assert_eq!(outcome.strategy, NONE_SUCCESSFUL);
            assert!(outcome.candidate.is_none());
        });
    }

    #[test]
    fn no_render_without_escalator_or_supplied_markup() {
        with_ctx(|ctx| {
            assert!(ctx.rendered_document().is_none());
            assert!(!ctx.escalated());
        });
    }

    #[test]
    fn supplied_rendered_markup_is_used_for_any_domain() {
        let doc = FetchedDocument::parse("<p>static</p>").with_rendered_html("<p>Ingredients: Tuna</p>");
        let source = SourceUrl::new("https://example.com/p/1");
        let options = Options::default();
        let sites = SiteRegistry::empty();
        let ctx = ExtractionContext::new(&doc, &source, Lexicon::builtin(), &options, &sites);

        let rendered = ctx.rendered_document();
        assert!(rendered.is_some_and(|d| d.text().contains("Tuna")));
        assert!(ctx.escalated());
    }
}
