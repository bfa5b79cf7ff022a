use httpmock::prelude::*;
use httpmock::Method::HEAD;

use coresync_store::{Credentials, ObjectStore, S3Client, StoreError};

fn client(server: &MockServer) -> S3Client {
    S3Client::new(
        Credentials::new("AKIDEXAMPLE", "secret"),
        "cna-webfiles",
        "us-east-1",
        Some(&server.base_url()),
    )
    .unwrap()
}

fn list_xml(keys: &[&str], prefixes: &[&str], next: Option<&str>) -> String {
    let mut xml = String::from("<ListBucketResult>");
    xml.push_str(&format!("<IsTruncated>{}</IsTruncated>", next.is_some()));
    if let Some(token) = next {
        xml.push_str(&format!("<NextContinuationToken>{token}</NextContinuationToken>"));
    }
    for key in keys {
        xml.push_str(&format!("<Contents><Key>{key}</Key></Contents>"));
    }
    for prefix in prefixes {
        xml.push_str(&format!("<CommonPrefixes><Prefix>{prefix}</Prefix></CommonPrefixes>"));
    }
    xml.push_str("</ListBucketResult>");
    xml
}

#[test]
fn test_list_keys_follows_continuation_token() {
    let server = MockServer::start();

    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/cna-webfiles")
            .query_param("list-type", "2")
            .query_param("prefix", "webdata/drillcore/")
            .query_param_missing("continuation-token")
            .header_exists("authorization")
            .header_exists("x-amz-date");
        then.status(200).body(list_xml(
            &["webdata/drillcore/A/composites/1.jpg"],
            &[],
            Some("page-2"),
        ));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET)
            .path("/cna-webfiles")
            .query_param("continuation-token", "page-2");
        then.status(200)
            .body(list_xml(&["webdata/drillcore/B/readme.html"], &[], None));
    });

    let keys = client(&server).list_keys("webdata/drillcore/").unwrap();

    assert_eq!(
        keys,
        vec![
            "webdata/drillcore/A/composites/1.jpg",
            "webdata/drillcore/B/readme.html"
        ]
    );
    page1.assert();
    page2.assert();
}

#[test]
fn test_list_prefixes_uses_delimiter() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/cna-webfiles")
            .query_param("delimiter", "/")
            .query_param("prefix", "webdata/drillcore/");
        then.status(200).body(list_xml(
            &[],
            &["webdata/drillcore/DDH-01/", "webdata/drillcore/DDH-02/"],
            None,
        ));
    });

    let prefixes = client(&server).list_prefixes("webdata/drillcore/").unwrap();
    assert_eq!(prefixes, vec!["webdata/drillcore/DDH-01/", "webdata/drillcore/DDH-02/"]);
    mock.assert();
}

#[test]
fn test_list_failure_is_http_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cna-webfiles");
        then.status(403).body("<Error><Code>AccessDenied</Code></Error>");
    });

    let err = client(&server).list_keys("webdata/").unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("AccessDenied"));
}

#[test]
fn test_head_maps_404_to_false() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(HEAD).path("/cna-webfiles/webdata/drillcore/A/A_DATA.html");
        then.status(200);
    });
    server.mock(|when, then| {
        when.method(HEAD).path("/cna-webfiles/webdata/drillcore/B/B_DATA.html");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(HEAD).path("/cna-webfiles/webdata/drillcore/C/C_DATA.html");
        then.status(403);
    });

    let c = client(&server);
    assert!(c.head("webdata/drillcore/A/A_DATA.html").unwrap());
    assert!(!c.head("webdata/drillcore/B/B_DATA.html").unwrap());
    let err = c.head("webdata/drillcore/C/C_DATA.html").unwrap_err();
    assert!(matches!(err, StoreError::Http { status: 403, .. }));
}

#[test]
fn test_delete_prefix_posts_checksummed_batch() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/cna-webfiles")
            .query_param("prefix", "webdata/drillcore/A/composites/");
        then.status(200).body(list_xml(
            &[
                "webdata/drillcore/A/composites/1.jpg",
                "webdata/drillcore/A/composites/2.jpg",
            ],
            &[],
            None,
        ));
    });
    let delete = server.mock(|when, then| {
        when.method(POST)
            .path("/cna-webfiles")
            .query_param_exists("delete")
            .header_exists("x-amz-checksum-sha256")
            .header("content-type", "application/xml");
        then.status(200).body(
            "<DeleteResult>\
             <Deleted><Key>webdata/drillcore/A/composites/1.jpg</Key></Deleted>\
             <Deleted><Key>webdata/drillcore/A/composites/2.jpg</Key></Deleted>\
             </DeleteResult>",
        );
    });

    let deleted = client(&server)
        .delete_prefix("webdata/drillcore/A/composites/")
        .unwrap();
    assert_eq!(deleted, 2);
    delete.assert();
}

#[test]
fn test_delete_prefix_with_nothing_listed_sends_no_delete() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cna-webfiles");
        then.status(200).body(list_xml(&[], &[], None));
    });
    let delete = server.mock(|when, then| {
        when.method(POST).path("/cna-webfiles");
        then.status(200).body("<DeleteResult/>");
    });

    assert_eq!(client(&server).delete_prefix("webdata/x/").unwrap(), 0);
    delete.assert_hits(0);
}

#[test]
fn test_upload_puts_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("core_01.jpg");
    std::fs::write(&path, b"jpeg-bytes").unwrap();

    let server = MockServer::start();
    let put = server.mock(|when, then| {
        when.method(PUT)
            .path("/cna-webfiles/webdata/drillcore/A/composites/core_01.jpg")
            .header("content-type", "image/jpeg")
            .header_exists("x-amz-content-sha256")
            .body("jpeg-bytes");
        then.status(200);
    });

    client(&server)
        .upload(&path, "webdata/drillcore/A/composites/core_01.jpg")
        .unwrap();
    put.assert();
}

#[test]
fn test_upload_missing_file_is_io_error() {
    let server = MockServer::start();
    let err = client(&server)
        .upload(std::path::Path::new("/definitely/not/here.jpg"), "k")
        .unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}
