use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use petfood_extract::sites::SitePlugin;
use petfood_extract::{
    BrowserSession, DisclosurePlan, Error, Escalator, Extractor, FetchedDocument, Field, Result,
    SessionFactory, SessionPool, SiteRegistry, INGREDIENTS_NOT_AVAILABLE,
};

const STATIC_PAGE: &str = r#"<html><head><title>Turkey Recipe Wet Cat Food</title></head>
    <body><h1>Turkey Recipe Wet Cat Food</h1><div id="tabs"></div></body></html>"#;

const RENDERED_PAGE: &str = r#"<html><head><title>Turkey Recipe Wet Cat Food</title></head>
    <body><h1>Turkey Recipe Wet Cat Food</h1>
    <div id="tabs"><p>Ingredients: Turkey, Turkey Broth, Liver, Guar Gum, Taurine.</p></div>
    </body></html>"#;

struct ScriptedSession {
    html: &'static str,
    fail: bool,
}

impl BrowserSession for ScriptedSession {
    fn is_alive(&mut self) -> bool {
        true
    }

    fn render(&mut self, _url: &str, _plan: &DisclosurePlan) -> Result<String> {
        if self.fail {
            return Err(Error::Escalation("tab never appeared".to_string()));
        }
        Ok(self.html.to_string())
    }

    fn close(&mut self) {}
}

struct CountingFactory {
    created: Arc<AtomicUsize>,
    html: &'static str,
    fail: bool,
}

impl SessionFactory for CountingFactory {
    fn create(&self) -> Result<Box<dyn BrowserSession>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            html: self.html,
            fail: self.fail,
        }))
    }
}

fn extractor(fail: bool) -> (Extractor, Arc<AtomicUsize>) {
    rendering_extractor(RENDERED_PAGE, fail)
}

fn rendering_extractor(html: &'static str, fail: bool) -> (Extractor, Arc<AtomicUsize>) {
    let created = Arc::new(AtomicUsize::new(0));
    let pool = SessionPool::new(CountingFactory {
        created: Arc::clone(&created),
        html,
        fail,
    });
    let sites = SiteRegistry::default().with(SitePlugin::new("example-shop.com").with_rendering());
    let extractor = Extractor::new()
        .with_sites(sites)
        .with_escalator(Escalator::new(Arc::new(pool)));
    (extractor, created)
}

#[test]
fn rendered_dom_supplies_hidden_ingredients() {
    let (extractor, created) = extractor(false);
    let doc = FetchedDocument::parse(STATIC_PAGE);
    let record = extractor.extract(&doc, "https://www.example-shop.com/cat/turkey-recipe");

    assert_eq!(
        record.ingredients,
        Some(["Turkey", "Turkey Broth", "Liver", "Guar Gum", "Taurine"].map(String::from).to_vec())
    );
    assert!(record
        .extraction_trace
        .strategy(Field::Ingredients)
        .is_some_and(|s| s.starts_with("rendered_dom:")));
    assert!(record.extraction_trace.escalated);
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[test]
fn one_session_serves_several_pages() {
    let (extractor, created) = extractor(false);
    let doc = FetchedDocument::parse(STATIC_PAGE);
    for n in 0..3 {
        let record = extractor.extract(&doc, &format!("https://example-shop.com/p/{n}"));
        assert!(record.ingredients.is_some());
    }
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[test]
fn caller_supplied_rendered_markup_needs_no_browser() {
    let doc = FetchedDocument::parse(STATIC_PAGE).with_rendered_html(RENDERED_PAGE);
    let record = Extractor::new().extract(&doc, "https://unregistered.example.org/turkey");

    assert_eq!(record.ingredients.as_ref().map(Vec::len), Some(5));
    assert!(record.extraction_trace.escalated);
}

#[test]
fn failed_render_falls_back_to_static_result() {
    let (extractor, created) = extractor(true);
    let doc = FetchedDocument::parse(STATIC_PAGE);
    let record = extractor.extract(&doc, "https://example-shop.com/cat/turkey-recipe");

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(record.ingredients, None);
    assert_eq!(record.ingredients_note.as_deref(), Some(INGREDIENTS_NOT_AVAILABLE));
    assert!(!record.extraction_trace.escalated);
}

#[test]
fn unregistered_domain_never_opens_a_browser() {
    let (extractor, created) = extractor(false);
    let doc = FetchedDocument::parse(STATIC_PAGE);
    let record = extractor.extract(&doc, "https://other-shop.com/cat/turkey-recipe");

    assert_eq!(created.load(Ordering::SeqCst), 0);
    assert_eq!(record.ingredients, None);
    assert!(!record.extraction_trace.escalated);
}

#[test]
fn static_hit_skips_escalation() {
    let (extractor, created) = extractor(false);
    let doc = FetchedDocument::parse(RENDERED_PAGE);
    let record = extractor.extract(&doc, "https://example-shop.com/cat/turkey-recipe");

    assert!(record.ingredients.is_some());
    assert!(record
        .extraction_trace
        .strategy(Field::Ingredients)
        .is_some_and(|s| s.starts_with("scored_text:")));
    // Nutrition still looks at the rendered page when the panel is missing.
    assert!(created.load(Ordering::SeqCst) <= 1);
}

#[test]
fn protein_mismatch_is_replaced_by_rendered_list() {
    let static_page = r#"<html><head><title>Wild Salmon Recipe Cat Food</title></head><body>
        <h1>Wild Salmon Recipe Cat Food</h1>
        <p>Ingredients: Beef, Beef Broth, Liver, Guar Gum, Taurine.</p>
        </body></html>"#;
    let rendered_page = r#"<html><head><title>Wild Salmon Recipe Cat Food</title></head><body>
        <h1>Wild Salmon Recipe Cat Food</h1>
        <p>Ingredients: Salmon, Salmon Broth, Liver, Guar Gum, Taurine.</p>
        </body></html>"#;

    let (extractor, created) = rendering_extractor(rendered_page, false);
    let doc = FetchedDocument::parse(static_page);
    let record = extractor.extract(&doc, "https://example-shop.com/cat/wild-salmon");

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(
        record.ingredients.as_ref().and_then(|i| i.first()).map(String::as_str),
        Some("Salmon")
    );
    assert_eq!(record.extraction_trace.strategy(Field::Ingredients), Some("rendered_dom:labeled_block"));
    assert!(record.extraction_trace.escalated);
}

#[test]
fn protein_mismatch_without_rendering_keeps_static_list() {
    let static_page = r#"<html><head><title>Wild Salmon Recipe Cat Food</title></head><body>
        <p>Ingredients: Beef, Beef Broth, Liver, Guar Gum, Taurine.</p>
        </body></html>"#;

    let record = Extractor::new().extract(&FetchedDocument::parse(static_page), "https://other-shop.com/wild-salmon");
    assert_eq!(
        record.ingredients.as_ref().and_then(|i| i.first()).map(String::as_str),
        Some("Beef")
    );
    assert_eq!(record.extraction_trace.strategy(Field::Ingredients), Some("suspicious_fallback"));
}
