use petfood_extract::{extract, extract_bytes, extract_from_url_only, BRAND_NOT_FOUND};

const MALFORMED: &[&str] = &[
    "<html><body><p>Ingredients: Chicken, <b>Rice</p></body>",
    "<div><div><div><span>Crude Protein (min) 26%",
    "<script>{\"ingredients\": \"Chicken, Rice</script>",
    "<script type=\"application/ld+json\">{\"@type\": \"Product\", \"brand\": </script>",
    "<meta property=\"og:image\" content=\"\"><img src=\"\"><img srcset=\",,,\">",
    "<h2>Ingredients</h2><h2>Ingredients</h2><h2>Ingredients</h2>",
    "<p>Ingredients: ,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,</p>",
    "<p>Calorie Content: 99999999999999999999999 kcal/kg</p>",
    "<title></title><title>Blue Buffalo</title>",
    "\u{202e}\u{200b}<p>Ingrédients : Poulet, Riz</p>",
];

#[test]
fn malformed_markup_still_yields_complete_records() {
    for html in MALFORMED {
        let record = extract(html, "https://example.com/p");
        assert!(!record.brand.is_empty(), "{html}");
        assert!(!record.image_url.is_empty(), "{html}");
        assert!(!record.texture.is_empty(), "{html}");
        assert!(
            record.ingredients.is_some() || record.ingredients_note.is_some(),
            "{html}"
        );
    }
}

#[test]
fn odd_source_urls_are_tolerated() {
    for url in ["", "not a url", "http://", "//cdn.example.com/x", "ftp://example.com/a b"] {
        let record = extract("<html></html>", url);
        assert_eq!(record.brand, BRAND_NOT_FOUND);
        let partial = extract_from_url_only(url);
        assert!(!partial.texture.is_empty());
    }
}

#[test]
fn invalid_bytes_are_replaced_not_rejected() {
    let record = extract_bytes(b"<html><title>\xff\xfe Orijen \xc3</title></html>", Some("text/html; charset=utf-8"), "https://example.com/p");
    assert_eq!(record.brand, "Orijen");
}

#[test]
fn huge_flat_page_is_handled() {
    let mut html = String::from("<html><body>");
    for _ in 0..2_000 {
        html.push_str("<div><p>Shop now. Free shipping on orders over $49.</p></div>");
    }
    html.push_str("<p>Ingredients: Lamb, Brown Rice, Oatmeal, Barley, Taurine.</p></body></html>");

    let record = extract(&html, "https://example.com/lamb");
    assert_eq!(record.ingredients.as_ref().and_then(|i| i.first()).map(String::as_str), Some("Lamb"));
}
