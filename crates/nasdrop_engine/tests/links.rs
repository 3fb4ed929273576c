use nasdrop_engine::extract_links;
use pretty_assertions::assert_eq;

#[test]
fn apache_style_index_yields_literal_targets_in_order() {
    let html = r#"
        <h1>Index of /pub/iso</h1>
        <pre><a href="?C=N;O=D">Name</a>
        <a href="/pub/">Parent Directory</a>
        <a href="debian%2012/">debian 12/</a>
        <a href="SHA256SUMS">SHA256SUMS</a>
        <A HREF='netinst.iso'>netinst.iso</A>
        </pre>"#;

    assert_eq!(
        extract_links(html),
        vec!["?C=N;O=D", "/pub/", "debian%2012/", "SHA256SUMS", "netinst.iso"]
    );
}

#[test]
fn anchors_with_other_attributes_are_matched() {
    let html = r#"<a class="file" href = "a&amp;b.zip" title="x">a</a>"#;
    assert_eq!(extract_links(html), vec!["a&amp;b.zip"]);
}

#[test]
fn empty_or_linkless_input_yields_nothing() {
    assert!(extract_links("").is_empty());
    assert!(extract_links("<p>no links</p><link href=\"style.css\">").is_empty());
    assert!(extract_links(r#"<a href="">empty</a><a name="top">anchor</a>"#).is_empty());
}
