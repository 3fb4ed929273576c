use nasdrop_engine::{decode_page, DecodeError};

#[test]
fn bom_wins_over_declared_charset() {
    let bytes = b"\xEF\xBB\xBF<a href=\"x\">x</a>";

    let page = decode_page(bytes, Some("text/html; charset=ISO-8859-1")).unwrap();

    assert_eq!(page.encoding_label, "UTF-8");
    assert_eq!(page.text, "<a href=\"x\">x</a>");
}

#[test]
fn quoted_charset_parameter_is_honoured() {
    let page = decode_page(b"Gr\xfc\xdfe", Some("text/html; Charset=\"windows-1252\"")).unwrap();

    assert_eq!(page.encoding_label, "windows-1252");
    assert_eq!(page.text, "Grüße");
}

#[test]
fn undeclared_utf8_is_detected() {
    let page = decode_page("<a href=\"caf\u{e9}/\">café</a>".as_bytes(), Some("text/html")).unwrap();

    assert_eq!(page.encoding_label, "UTF-8");
    assert!(page.text.contains("café"));
}

#[test]
fn invalid_bytes_for_declared_charset_fail() {
    let err = decode_page(b"ok \xff\xfd", Some("text/html; charset=utf-8")).unwrap_err();

    assert_eq!(
        err,
        DecodeError::Malformed {
            encoding: "UTF-8".to_string()
        }
    );
}
