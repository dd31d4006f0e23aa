//! Integration tests for identifier transformation.

use schemata::naming::{camel_name, exported_name, initials, short_name, ACRONYMS};

#[test]
fn test_acronym_table_order() {
    let tokens: Vec<&str> = ACRONYMS.iter().map(|(token, _)| *token).collect();
    assert_eq!(tokens, vec!["id", "ip", "url"]);
}

#[test]
fn test_column_names() {
    let cases = [
        ("profile_url", "ProfileURL", "profileURL"),
        ("server_ip", "ServerIP", "serverIP"),
        ("customer_id", "CustomerID", "customerID"),
        ("created_at", "CreatedAt", "createdAt"),
        ("valid_until", "ValidUntil", "validUntil"),
    ];

    for (raw, exported, camel) in cases {
        assert_eq!(exported_name(raw), exported, "exported name of {}", raw);
        assert_eq!(camel_name(raw), camel, "camel name of {}", raw);
    }
}

#[test]
fn test_each_acronym_applies_once() {
    // "Ip" and "Url" are distinct tokens, each replaced once.
    assert_eq!(exported_name("client_ip_url"), "ClientIPURL");
    // Second "Id" survives.
    assert_eq!(exported_name("id_parent_id"), "IDParentId");
}

#[test]
fn test_lower_case_letters_are_not_acronyms() {
    assert_eq!(exported_name("paid"), "Paid");
    assert_eq!(exported_name("guid"), "Guid");
}

#[test]
fn test_short_names() {
    assert_eq!(short_name("client_ip_url"), "ci");
    assert_eq!(short_name("ip_address"), "i");
    assert_eq!(short_name("order_line_items"), "oli");
    assert_eq!(initials("HTTPServer"), "h");
}
