//! Per-domain plug-ins.
//!
//! A [`SiteRegistry`] maps retailer domains to extra field strategies that
//! run ahead of the generic chains, to the image rewrites the domain needs,
//! and to whether its ingredients only appear on a rendered page.

use crate::candidate::Candidate;
use crate::chain::{ExtractionContext, Strategy};
use crate::dom::{self, Selection};
use crate::error::{Error, Result};
use crate::fields::brand::collapse_doubled;
use crate::patterns::{DRUPAL_IMAGE_STYLE, SHOP_ALL};
use crate::result::Field;
use crate::url_utils::host_matches;

/// URL rewrite applied to resolved image URLs of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRewrite {
    /// Drop Drupal image-style derivatives (`/styles/thumbnail/public/` → `/`).
    DrupalStyles,
}

impl ImageRewrite {
    #[must_use]
    pub fn apply(self, url: &str) -> String {
        match self {
            Self::DrupalStyles => DRUPAL_IMAGE_STYLE.replace(url, "/").into_owned(),
        }
    }
}

/// Heuristics registered for one domain (and its subdomains).
#[derive(Debug, Clone)]
pub struct SitePlugin {
    pub domain: String,
    pub strategies: Vec<(Field, Strategy)>,
    pub requires_rendering: bool,
    pub image_rewrites: Vec<ImageRewrite>,
}

impl SitePlugin {
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().to_lowercase(),
            strategies: Vec::new(),
            requires_rendering: false,
            image_rewrites: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, field: Field, strategy: Strategy) -> Self {
        self.strategies.push((field, strategy));
        self
    }

    #[must_use]
    pub fn with_rendering(mut self) -> Self {
        self.requires_rendering = true;
        self
    }

    #[must_use]
    pub fn with_image_rewrite(mut self, rewrite: ImageRewrite) -> Self {
        self.image_rewrites.push(rewrite);
        self
    }

    fn matches(&self, host: &str) -> bool {
        host_matches(host, &self.domain)
    }
}

/// Every registered plug-in.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    plugins: Vec<SitePlugin>,
}

impl SiteRegistry {
    /// A registry with no plug-ins.
    #[must_use]
    pub fn empty() -> Self {
        Self { plugins: Vec::new() }
    }

    /// Add a plug-in. Later registrations for the same domain add to earlier ones.
    pub fn register(&mut self, plugin: SitePlugin) {
        self.plugins.push(plugin);
    }

    #[must_use]
    pub fn with(mut self, plugin: SitePlugin) -> Self {
        self.register(plugin);
        self
    }

    /// Site strategies for `field` on `host`, in registration order.
    #[must_use]
    pub fn strategies_for(&self, host: Option<&str>, field: Field) -> Vec<Strategy> {
        let Some(host) = host else {
            return Vec::new();
        };
        self.plugins
            .iter()
            .filter(|p| p.matches(host))
            .flat_map(|p| p.strategies.iter())
            .filter(|(f, _)| *f == field)
            .map(|(_, s)| *s)
            .collect()
    }

    /// Whether pages on `host` need a rendered DOM for ingredients.
    #[must_use]
    pub fn requires_rendering(&self, host: Option<&str>) -> bool {
        host.is_some_and(|h| self.plugins.iter().any(|p| p.requires_rendering && p.matches(h)))
    }

    /// Apply the image rewrites registered for `host`.
    #[must_use]
    pub fn rewrite_image(&self, host: Option<&str>, url: String) -> String {
        let Some(host) = host else {
            return url;
        };
        self.plugins
            .iter()
            .filter(|p| p.matches(host))
            .flat_map(|p| p.image_rewrites.iter())
            .fold(url, |acc, rewrite| rewrite.apply(&acc))
    }
}

impl Default for SiteRegistry {
    /// The built-in retailer plug-ins.
    fn default() -> Self {
        let shop_all = Strategy::new("site:shop_all_link", shop_all_link);

        Self::empty()
            .with(SitePlugin::new("chewy.com").with_strategy(Field::Brand, shop_all))
            .with(SitePlugin::new("petco.com").with_strategy(Field::Brand, shop_all))
            .with(SitePlugin::new("petsmart.com").with_strategy(Field::Brand, shop_all))
            .with(SitePlugin::new("purina.com").with_image_rewrite(ImageRewrite::DrupalStyles))
            .with(SitePlugin::new("target.com").with_rendering())
            .with(SitePlugin::new("walmart.com").with_rendering())
    }
}

/// Brand from a "Shop all Acme" / "Show all Acme" link.
fn shop_all_link(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    for node in ctx.doc.select("a, button").nodes() {
        let link = Selection::from(*node);
        let text = dom::clean_text(&link);
        if text.len() > 80 {
            continue;
        }
        if let Some(caps) = SHOP_ALL.captures(&text) {
            let brand = caps
                .name("brand")
                .map(|m| collapse_doubled(m.as_str().trim()))
                .ok_or_else(|| Error::strategy("site:shop_all_link", "empty capture"))?;
            return Ok(Some(Candidate::text(brand, "site:shop_all_link")));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_matches_subdomains() {
        let sites = SiteRegistry::default();
        assert_eq!(sites.strategies_for(Some("chewy.com"), Field::Brand).len(), 1);
        assert_eq!(sites.strategies_for(Some("m.petco.com"), Field::Brand).len(), 1);
        assert!(sites.strategies_for(Some("chewy.com"), Field::Image).is_empty());
        assert!(sites.strategies_for(Some("notchewy.com"), Field::Brand).is_empty());
        assert!(sites.strategies_for(None, Field::Brand).is_empty());
    }

    #[test]
    fn rendering_domains() {
        let sites = SiteRegistry::default();
        assert!(sites.requires_rendering(Some("target.com")));
        assert!(!sites.requires_rendering(Some("chewy.com")));
        assert!(!sites.requires_rendering(None));
    }

    #[test]
    fn drupal_rewrite_only_on_registered_domain() {
        let sites = SiteRegistry::default();
        let url = "https://www.purina.com/sites/default/files/styles/social_share/public/a.png".to_string();
        assert_eq!(
            sites.rewrite_image(Some("purina.com"), url.clone()),
            "https://www.purina.com/sites/default/files/a.png"
        );
        assert_eq!(sites.rewrite_image(Some("chewy.com"), url.clone()), url);
    }

    #[test]
    fn custom_plugins_extend_the_registry() {
        let sites = SiteRegistry::empty().with(SitePlugin::new("Example.COM").with_rendering());
        assert!(sites.requires_rendering(Some("shop.example.com")));
    }
}
