use petfood_extract::url_utils::resolve_url;
use petfood_extract::{extract, Field, IMAGE_NOT_FOUND};
use url::Url;

fn image_of(html: &str, url: &str) -> (String, Option<String>) {
    let record = extract(html, url);
    let strategy = record.extraction_trace.strategy(Field::Image).map(str::to_string);
    (record.image_url, strategy)
}

#[test]
fn protocol_relative_and_root_relative_resolution() {
    assert_eq!(
        resolve_url("//cdn.example.com/a.jpg", None).as_deref(),
        Some("https://cdn.example.com/a.jpg")
    );
    let base = Url::parse("https://site.com/p/1").ok();
    assert_eq!(
        resolve_url("/img/a.jpg", base.as_ref()).as_deref(),
        Some("https://site.com/img/a.jpg")
    );
}

#[test]
fn product_image_beats_og_image() {
    let html = r#"<html><head><meta property="og:image" content="https://cdn.shop.com/share.jpg"></head>
        <body>
          <img src="/static/logo.png" alt="Shop logo">
          <img src="/media/catalog/product/kibble-main.jpg" class="product-image" width="600">
        </body></html>"#;

    let (url, strategy) = image_of(html, "https://shop.com/kibble");
    assert_eq!(url, "https://shop.com/media/catalog/product/kibble-main.jpg");
    assert_eq!(strategy.as_deref(), Some("product_img"));
}

#[test]
fn lazy_loaded_and_srcset_sources() {
    let html = r#"<html><body>
        <img data-src="https://images.shop.com/gallery/salmon-pate.jpg" class="gallery-image">
        </body></html>"#;
    assert_eq!(image_of(html, "https://shop.com/p").0, "https://images.shop.com/gallery/salmon-pate.jpg");

    let html = r#"<html><body>
        <img srcset="https://images.shop.com/pdp/salmon-800.jpg 800w, https://images.shop.com/pdp/salmon-1600.jpg 1600w">
        </body></html>"#;
    assert_eq!(image_of(html, "https://shop.com/p").0, "https://images.shop.com/pdp/salmon-800.jpg");
}

#[test]
fn og_image_is_resolved_against_page() {
    let html = r#"<html><head><meta property="og:image" content="/files/bag.png"></head><body></body></html>"#;
    let (url, strategy) = image_of(html, "https://brand.example.com/dog/bag");
    assert_eq!(url, "https://brand.example.com/files/bag.png");
    assert_eq!(strategy.as_deref(), Some("og_image"));
}

#[test]
fn json_ld_image_object() {
    let html = r#"<html><head><script type="application/ld+json">
        {"@type": "Product", "image": [{"@type": "ImageObject", "url": "https://cdn.example.com/p/1.jpg"}]}
        </script></head><body></body></html>"#;
    let (url, strategy) = image_of(html, "https://example.com/p");
    assert_eq!(url, "https://cdn.example.com/p/1.jpg");
    assert_eq!(strategy.as_deref(), Some("json_ld"));
}

#[test]
fn background_image_fallback() {
    let html = r#"<html><body><div class="hero" style="background-image: url('/assets/hero-bag.webp')"></div></body></html>"#;
    let (url, strategy) = image_of(html, "https://example.com/p");
    assert_eq!(url, "https://example.com/assets/hero-bag.webp");
    assert_eq!(strategy.as_deref(), Some("css_background"));
}

#[test]
fn script_payload_scan() {
    let html = r#"<html><body><script>
        window.__STATE__ = {"product": {"image": "https:\/\/media.example.net\/p\/bag-front.jpg"}};
        </script></body></html>"#;
    let (url, strategy) = image_of(html, "https://example.com/p");
    assert_eq!(url, "https://media.example.net/p/bag-front.jpg");
    assert_eq!(strategy.as_deref(), Some("script_scan"));
}

#[test]
fn drupal_styles_rewritten_on_purina() {
    let html = r#"<html><head><meta property="og:image"
        content="https://www.purina.com/sites/default/files/styles/social_share/public/products/friskies.png">
        </head><body></body></html>"#;
    let (url, _) = image_of(html, "https://www.purina.com/cats/friskies");
    assert_eq!(url, "https://www.purina.com/sites/default/files/products/friskies.png");
}

#[test]
fn no_image_gives_sentinel() {
    let (url, _) = image_of("<html><body><p>Out of stock</p></body></html>", "https://example.com/p");
    assert_eq!(url, IMAGE_NOT_FOUND);
}
