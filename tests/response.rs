use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use restcheck::{
    Deserializer, DeserializerRegistry, Format, Response, ResponseConfig, ResponseError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Message {
    id: u64,
    text: String,
    tags: Vec<String>,
}

/// JSON deserializer that counts how often it runs.
#[derive(Clone, Default)]
struct CountingJson {
    calls: Arc<AtomicUsize>,
}

impl Deserializer for CountingJson {
    fn name(&self) -> &str {
        "counting-json"
    }

    fn format(&self) -> Format {
        Format::Json
    }

    fn deserialize(&self, body: &str) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(std::time::Duration::from_millis(2));
        Ok(serde_json::from_str(body)?)
    }
}

fn counting_config() -> (ResponseConfig, Arc<AtomicUsize>) {
    let counting = CountingJson::default();
    let calls = counting.calls.clone();
    let mut registry = DeserializerRegistry::with_defaults();
    registry.register("application/json", counting);
    (ResponseConfig::default().registry(registry), calls)
}

fn json_response(body: &str, config: ResponseConfig) -> Response {
    Response::builder()
        .status_line("HTTP/1.1 200 OK")
        .header("Content-Type", "application/json")
        .body(body)
        .config(config)
        .build()
        .unwrap()
}

#[test]
fn header_lookup_ignores_name_case() {
    init_logging();
    let response = Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .build()
        .unwrap();

    for name in ["Content-Type", "content-type", "CONTENT-TYPE"] {
        assert_eq!(response.header(name), Some("text/plain"));
    }
}

#[test]
fn repeated_headers_keep_order() {
    let response = Response::builder()
        .status(200)
        .header("Vary", "Accept")
        .header("X-Other", "1")
        .header("vary", "Origin")
        .build()
        .unwrap();

    assert_eq!(response.header("Vary"), Some("Accept"));
    assert_eq!(response.headers().get_all("VARY"), vec!["Accept", "Origin"]);
}

#[test]
fn set_cookie_with_distinct_and_same_names() {
    let distinct = Response::builder()
        .status(200)
        .header("Set-Cookie", "a=1")
        .header("Set-Cookie", "b=2")
        .build()
        .unwrap();
    let cookies = distinct.cookies();
    assert_eq!(cookies.get("a").map(String::as_str), Some("1"));
    assert_eq!(cookies.get("b").map(String::as_str), Some("2"));

    let same = Response::builder()
        .status(200)
        .header("Set-Cookie", "a=first; Path=/")
        .header("Set-Cookie", "a=second; Max-Age=10")
        .build()
        .unwrap();
    assert_eq!(same.cookie("a"), Some("first"));
    let all = same.detailed_cookies().get_all("a");
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].value(), "second");
    assert_eq!(all[1].max_age(), Some(10));
}

#[test]
fn serialized_value_round_trips() {
    let message = Message {
        id: 9,
        text: "héllo".into(),
        tags: vec!["x".into(), "y".into()],
    };
    let body = serde_json::to_vec(&message).unwrap();

    let response = Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(body)
        .build()
        .unwrap();

    assert_eq!(response.as_type::<Message>().unwrap(), message);
}

#[test]
fn repeated_as_type_deserializes_once() {
    let (config, calls) = counting_config();
    let response = json_response(r#"{"id":1,"text":"a","tags":[]}"#, config);

    let first: Message = response.as_type().unwrap();
    let second: Message = response.as_type().unwrap();
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A different target type deserializes again from the raw bytes
    let tree: Value = response.as_type().unwrap();
    assert_eq!(tree["id"], 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn charset_is_read_from_content_type() {
    let response = Response::builder()
        .status(200)
        .header("Content-Type", "application/json; charset=ISO-8859-1")
        .body(b"{\"id\":1,\"text\":\"caf\xe9\",\"tags\":[]}".to_vec())
        .build()
        .unwrap();

    let ct = response.parsed_content_type();
    assert_eq!(ct.mime_type(), Some("application/json"));
    assert_eq!(ct.charset(), Some("ISO-8859-1"));
    assert_eq!(response.as_type::<Message>().unwrap().text, "café");
}

#[test]
fn missing_content_type_with_and_without_default() {
    let without_default = Response::builder()
        .status(200)
        .body(r#"{"a":1}"#)
        .build()
        .unwrap();
    assert!(matches!(
        without_default.as_type::<Value>(),
        Err(ResponseError::UnsupportedContentType(_))
    ));

    let config = ResponseConfig::default()
        .registry(DeserializerRegistry::with_defaults().with_default_format(Format::Json));
    let with_default = Response::builder()
        .status(200)
        .body(r#"{"a":1}"#)
        .config(config)
        .build()
        .unwrap();
    assert_eq!(with_default.as_type::<Value>().unwrap()["a"], 1);

    // An explicit hint works without any default
    assert_eq!(without_default.as_type_with::<Value>(Format::Json).unwrap()["a"], 1);
}

#[test]
fn session_id_uses_configured_cookie_name() {
    let response = Response::builder()
        .status(200)
        .header("Set-Cookie", "sid=abc123; Path=/; HttpOnly")
        .config(ResponseConfig::default().session_id_name("sid"))
        .build()
        .unwrap();

    assert_eq!(response.session_id(), Some("abc123"));
    assert!(response.detailed_cookie("sid").unwrap().is_http_only());
}

#[test]
fn concurrent_first_access_deserializes_once() {
    init_logging();
    let (config, calls) = counting_config();
    let response = json_response(r#"{"id":3,"text":"t","tags":["a"]}"#, config);

    let results: Vec<Message> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| response.as_type::<Message>().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|m| *m == results[0]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn path_tree_is_parsed_once() {
    let (config, calls) = counting_config();
    let response = Arc::new(json_response(
        r#"{"id":5,"text":"t","tags":["a","b"]}"#,
        config,
    ));

    assert_eq!(response.path::<u64>("id").unwrap(), Some(5));
    assert_eq!(response.path_value("tags[-1]").unwrap(), Some(Value::from("b")));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let response = response.clone();
            thread::spawn(move || response.path::<String>("text").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("t"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Typed results have their own cache
    let _: Value = response.as_type().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn format_hint_ignores_unrelated_registrations() {
    struct Csv;

    impl Deserializer for Csv {
        fn name(&self) -> &str {
            "csv"
        }

        fn format(&self) -> Format {
            Format::Text
        }

        fn deserialize(&self, body: &str) -> anyhow::Result<Value> {
            Ok(body
                .lines()
                .map(|l| Value::from(l.split(',').collect::<Vec<_>>()))
                .collect())
        }
    }

    let mut registry = DeserializerRegistry::with_defaults();
    registry.register("text/csv", Csv);
    let config = ResponseConfig::default().registry(registry);

    let plain = Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .body("hello, world")
        .config(config.clone())
        .build()
        .unwrap();
    assert_eq!(plain.as_type_with::<String>(Format::Text).unwrap(), "hello, world");
    assert_eq!(plain.as_type::<String>().unwrap(), "hello, world");

    let csv = Response::builder()
        .status(200)
        .header("Content-Type", "text/csv")
        .body("a,b")
        .config(config)
        .build()
        .unwrap();
    assert_eq!(csv.as_type::<Vec<Vec<String>>>().unwrap(), vec![vec!["a", "b"]]);
    assert_eq!(csv.as_type_with::<String>(Format::Text).unwrap(), "a,b");
}

#[test]
fn shared_response_across_threads() {
    let response = Arc::new(json_response(
        r#"{"id":4,"text":"t","tags":["a","b"]}"#,
        ResponseConfig::default(),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let response = response.clone();
            thread::spawn(move || response.path::<Vec<String>>("tags").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(vec!["a".to_string(), "b".to_string()]));
    }
}

#[test]
fn failed_as_type_does_not_poison_response() {
    let response = json_response("{broken", ResponseConfig::default());

    let err = response.as_type::<Message>().unwrap_err();
    assert!(matches!(err, ResponseError::Deserialization { .. }));
    assert!(err.to_string().contains("json"));

    assert_eq!(response.as_string().unwrap(), "{broken");
    assert_eq!(response.as_type_with::<String>(Format::Text).unwrap(), "{broken");
}

#[test]
fn form_body() {
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Login {
        user: String,
        roles: Vec<String>,
    }

    let response = Response::builder()
        .status(200)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("user=ann+lee&roles=admin&roles=dev")
        .build()
        .unwrap();

    let login: Login = response.as_type().unwrap();
    assert_eq!(login.user, "ann lee");
    assert_eq!(login.roles, vec!["admin", "dev"]);
    assert_eq!(response.path::<String>("user").unwrap().as_deref(), Some("ann lee"));
}

#[test]
fn construction_errors_are_fatal() {
    assert!(matches!(
        Response::builder().status(200).raw_header("nocolon").build(),
        Err(ResponseError::MalformedHeader(_))
    ));
    assert!(matches!(
        Response::builder()
            .status(200)
            .header("Set-Cookie", "; Path=/")
            .build(),
        Err(ResponseError::MalformedCookie(_))
    ));
}

#[test]
fn response_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Response>();
}
