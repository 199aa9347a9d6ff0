use cloud_sdk_core::{
    ClientError, JsonPatchOperation, NameValue, ParamValue, RequestBody, RequestBuilder, Url, add,
    resolve_body, resolve_request_url, resolve_request_url_with_params,
};
use serde_json::{Value, json};

#[test]
fn supplied_placeholders_are_fully_substituted() {
    for value in ["v", "with space", "a/b", "caf\u{e9}", "100%"] {
        let url = resolve_request_url_with_params(
            "https://api.example.com/v2",
            "/things/{p}/{p}",
            &[("p", value)],
        )
        .expect("resolves");

        assert!(!url.as_str().contains('{'), "{url}");
        assert!(!url.as_str().contains('}'), "{url}");
        assert!(url.path().starts_with("/v2/things/"), "{url}");
    }
}

#[test]
fn any_empty_path_parameter_is_rejected() {
    let error = resolve_request_url_with_params(
        "https://api.example.com",
        "/{a}/{b}",
        &[("a", "ok"), ("b", "")],
    )
    .expect_err("empty value");
    assert!(matches!(error, ClientError::InvalidArgument(_)));

    let error = resolve_request_url_with_params("https://api.example.com", "", &[("a", "")])
        .expect_err("empty value without template");
    assert!(matches!(error, ClientError::InvalidArgument(_)));
}

#[test]
fn repeated_value_expands_in_order() {
    let mut params = Vec::new();
    add(&mut params, "tags", ParamValue::repeated(["a", "b"]));

    assert_eq!(
        params,
        [
            NameValue::new("tags", Some("a".to_owned())),
            NameValue::new("tags", Some("b".to_owned())),
        ]
    );
}

#[test]
fn absent_content_type_leaves_body_unset() {
    let model = json!({"name": "ignored"});
    let body = resolve_body(None, Some(&model), None, Some("raw".into())).expect("resolves");
    assert!(body.is_none());
}

#[test]
fn get_with_body_fails_with_invalid_state() {
    let url = resolve_request_url("https://api.example.com", "/items").expect("resolves");
    let error = RequestBuilder::get(url)
        .body(RequestBody::new("x", Some("text/plain")))
        .build()
        .expect_err("body on GET");

    assert!(error.is_invalid_state());
}

#[test]
fn post_without_body_gets_zero_length_body() {
    let url = resolve_request_url("https://api.example.com", "/items").expect("resolves");
    let request = RequestBuilder::post(url).build().expect("builds");

    let body = request.body().expect("body present");
    assert_eq!(body.len(), 0);
    assert_eq!(body.content_type(), None);
}

#[test]
fn query_parameters_render_in_insertion_order() {
    let url = Url::parse("https://api.example.com/v1").expect("valid url");
    let builder = RequestBuilder::get(url).query("limit", 10).query("offset", 0);

    assert_eq!(
        builder.to_url().as_str(),
        "https://api.example.com/v1?limit=10&offset=0"
    );
}

#[test]
fn json_body_is_compact_with_json_media_type() {
    let url = Url::parse("https://api.example.com/v1/items").expect("valid url");
    let request = RequestBuilder::post(url)
        .body_json(&json!({"a": 1}))
        .build()
        .expect("builds");

    let body = request.body().expect("body present");
    assert_eq!(body.bytes(), br#"{"a":1}"#);
    assert_eq!(body.content_type(), Some("application/json"));
}

#[test]
fn patch_request_carries_json_patch_operations() {
    let url = resolve_request_url_with_params(
        "https://api.example.com/v1",
        "/instances/{instance_id}",
        &[("instance_id", "inst-1")],
    )
    .expect("resolves");
    let operations = [JsonPatchOperation::add("/tags/-", json!("prod"))];

    let request = RequestBuilder::patch(url)
        .header("If-Match", "W/\"etag\"")
        .body_content(
            Some("application/json-patch+json"),
            None::<&Value>,
            Some(&operations[..]),
            None,
        )
        .expect("serializes")
        .build()
        .expect("builds");

    assert_eq!(
        request.url().as_str(),
        "https://api.example.com/v1/instances/inst-1"
    );
    assert_eq!(
        request.body().expect("body present").bytes(),
        br#"[{"op":"add","path":"/tags/-","value":"prod"}]"#
    );
    assert_eq!(request.headers()["if-match"], "W/\"etag\"");
    assert_eq!(
        request.headers()["content-type"],
        "application/json-patch+json"
    );
}
